//! PNG bar chart of a word ranking
//!
//! Bars are always drawn. Titles and labels need a TrueType font, which is
//! looked up once from `FANOUT_CHART_FONT` or a few common system locations;
//! without one the chart is rendered unlabeled.

use crate::error::ChartError;
use crate::wordcount::WordCount;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// Default output path for the ranking chart
pub const DEFAULT_FIGURE: &str = "data/output/top_words.png";

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 500;
const MARGIN: i32 = 40;
const TITLE_AREA: i32 = 50;
const LABEL_AREA: i32 = 80;
const FONT_FAMILY: &str = "sans-serif";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

fn font_ready() -> bool {
    *FONT_READY.get_or_init(|| {
        let from_env = std::env::var_os("FANOUT_CHART_FONT").map(PathBuf::from);
        let candidates = from_env
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = fs::read(&path) else {
                continue;
            };
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
                debug!(font = %path.display(), "Chart font registered");
                return true;
            }
        }
        debug!("No chart font found, rendering without labels");
        false
    })
}

fn render_err<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> ChartError + '_ {
    move |e| ChartError::Render {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Render `ranking` as a vertical bar chart PNG at `path`
///
/// The parent directory is created if needed. An empty ranking produces a
/// placeholder image instead of a chart.
pub fn render_top_words(ranking: &[WordCount], path: &Path, title: &str) -> Result<PathBuf, ChartError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ChartError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let labeled = font_ready();
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err(path))?;

    if ranking.is_empty() {
        draw_placeholder(&root, labeled).map_err(render_err(path))?;
    } else {
        draw_bars(&root, ranking, title, labeled).map_err(render_err(path))?;
    }

    root.present().map_err(render_err(path))?;
    info!(path = %path.display(), bars = ranking.len(), "Wrote chart");
    Ok(path.to_path_buf())
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;
type DrawResult = Result<(), Box<dyn std::error::Error>>;

fn draw_placeholder(root: &Area<'_>, labeled: bool) -> DrawResult {
    let (w, h) = (WIDTH as i32, HEIGHT as i32);
    root.draw(&Rectangle::new(
        [(MARGIN, MARGIN), (w - MARGIN, h - MARGIN)],
        RGBColor(200, 200, 200).stroke_width(2),
    ))?;

    if labeled {
        let style = TextStyle::from((FONT_FAMILY, 24).into_font())
            .color(&RGBColor(90, 90, 90))
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new("No data to display", (w / 2, h / 2), style))?;
    }
    Ok(())
}

fn draw_bars(root: &Area<'_>, ranking: &[WordCount], title: &str, labeled: bool) -> DrawResult {
    let (w, h) = (WIDTH as i32, HEIGHT as i32);
    let top = MARGIN + TITLE_AREA;
    let bottom = h - LABEL_AREA;
    let plot_height = (bottom - top).max(1);
    let slot = ((w - 2 * MARGIN) / ranking.len() as i32).max(1);
    let bar_width = (slot * 7 / 10).max(1);
    let max = ranking.iter().map(|e| e.count).max().unwrap_or(1).max(1);

    // Axis
    root.draw(&PathElement::new(
        vec![(MARGIN, bottom), (w - MARGIN, bottom)],
        BLACK.stroke_width(1),
    ))?;

    for (i, entry) in ranking.iter().enumerate() {
        let x0 = MARGIN + i as i32 * slot + (slot - bar_width) / 2;
        let bar_height = ((entry.count as f64 / max as f64) * plot_height as f64).round() as i32;
        let y0 = bottom - bar_height.max(1);
        root.draw(&Rectangle::new(
            [(x0, y0), (x0 + bar_width, bottom)],
            RGBColor(70, 110, 180).filled(),
        ))?;

        if labeled {
            let center = x0 + bar_width / 2;
            let count_style = TextStyle::from((FONT_FAMILY, 13).into_font())
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            root.draw(&Text::new(entry.count.to_string(), (center, y0 - 4), count_style))?;

            let word_style = TextStyle::from((FONT_FAMILY, 13).into_font())
                .pos(Pos::new(HPos::Center, VPos::Top));
            root.draw(&Text::new(entry.word.clone(), (center, bottom + 6), word_style))?;
        }
    }

    if labeled {
        let title_style = TextStyle::from((FONT_FAMILY, 24).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new(title.to_string(), (w / 2, MARGIN + TITLE_AREA / 2), title_style))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    fn ranking() -> Vec<WordCount> {
        vec![
            WordCount {
                word: "dog".into(),
                count: 3,
            },
            WordCount {
                word: "bird".into(),
                count: 3,
            },
            WordCount {
                word: "cat".into(),
                count: 2,
            },
        ]
    }

    #[test]
    fn test_render_creates_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/top.png");

        let written = render_top_words(&ranking(), &path, "Top 3 words").unwrap();
        assert_eq!(written, path);

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_render_empty_ranking_placeholder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");

        render_top_words(&[], &path, "Top 0 words").unwrap();
        assert!(fs::read(&path).unwrap().starts_with(PNG_MAGIC));
    }
}
