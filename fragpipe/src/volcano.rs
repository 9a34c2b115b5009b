//! Volcano plots of a statistics output file.
//!
//! Every tested protein becomes a point at (log2 fold change, -log10 p).
//! Points are colored by how they compare to the [`Thresholds`]:
//!
//! * dark green: detected in only one condition
//! * orange: significant and up-regulated
//! * blue: significant and down-regulated
//! * translucent grey: everything else
//!
//! The plot is written as a standalone SVG and as an HTML page embedding
//! the same SVG, where hovering a point shows its accession and annotation.
//! No PDF is written: the SVG is the vector copy for print, and converts to
//! PDF with any SVG tool (e.g. `rsvg-convert -f pdf`).
use super::*;
use statistics::{read_points, Point};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;

pub const X_AXIS_TITLE: &str = "log2 fold change";
pub const Y_AXIS_TITLE: &str = "-log10 pvalue";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Exclusive,
    Up,
    Down,
    Neutral,
}

impl Color {
    pub fn css(&self) -> &'static str {
        match self {
            Color::Exclusive => "#006400",
            Color::Up => "#FFA500",
            Color::Down => "#3f65d4",
            Color::Neutral => "rgba(150,150,150,0.5)",
        }
    }

    /// Presence in a single condition wins over the significance cutoffs
    pub fn classify(point: &Point, thresholds: &Thresholds) -> Color {
        if point.exclusive() {
            return Color::Exclusive;
        }
        match (point.log2_fc, point.neg_log10_p) {
            (Some(fc), Some(p)) if thresholds.significant(p) && thresholds.up(fc) => Color::Up,
            (Some(fc), Some(p)) if thresholds.significant(p) && thresholds.down(fc) => Color::Down,
            _ => Color::Neutral,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dot {
    pub x: f64,
    pub y: f64,
    pub color: Color,
    pub accession: String,
    pub annotation: String,
}

impl Dot {
    fn hover(&self) -> String {
        format!(
            "SPO: {} | Annotation: {}\nlog2FC: {}\n-log10(p): {}",
            self.accession, self.annotation, self.x, self.y
        )
    }
}

/// Linear map from data to pixel coordinates
struct Scale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl Scale {
    fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Evenly spaced round tick positions covering `lo..=hi`
fn ticks(lo: f64, hi: f64) -> Vec<f64> {
    let span = hi - lo;
    if !(span > 0.0) {
        return vec![lo];
    }
    let raw = span / 6.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let mut v = Vec::new();
    let mut t = (lo / step).ceil() * step;
    while t <= hi + step * 1e-9 {
        // avoid printing -0
        v.push(if t.abs() < step * 1e-9 { 0.0 } else { t });
        t += step;
    }
    v
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Clone, Debug)]
pub struct Volcano {
    pub title: String,
    pub dots: Vec<Dot>,
    pub thresholds: Thresholds,
}

impl Volcano {
    /// Points outside the fold change limit, without a fold change or with
    /// a non-finite p are left out
    pub fn new<S: Into<String>>(title: S, points: &[Point], thresholds: Thresholds) -> Volcano {
        let filter = Filter::new().add_point_filter(PointFilter::FoldChangeRange(
            thresholds.plot_fold_change_limit,
        ));

        let dots = points
            .iter()
            .filter(|p| filter.keep_point(p.log2_fc))
            .filter_map(|p| match (p.log2_fc, p.neg_log10_p) {
                (Some(x), Some(y)) if y.is_finite() => Some(Dot {
                    x,
                    y,
                    color: Color::classify(p, &thresholds),
                    accession: p.accession.clone(),
                    annotation: p.annotation.clone(),
                }),
                _ => None,
            })
            .collect::<Vec<_>>();

        let skipped = points.len() - dots.len();
        if skipped > 0 {
            tracing::info!("{} points outside the plotted range", skipped);
        }

        Volcano {
            title: title.into(),
            dots,
            thresholds,
        }
    }

    fn scales(&self) -> (Scale, Scale) {
        let guide = self.thresholds.fold_change;
        let x_max = self
            .dots
            .iter()
            .fold(guide + 1.0, |acc, d| acc.max(d.x.abs()))
            * 1.05;
        let y_max = self
            .dots
            .iter()
            .fold(self.thresholds.neg_log10_p + 1.0, |acc, d| acc.max(d.y))
            * 1.05;
        let y_min = self.dots.iter().fold(0.0f64, |acc, d| acc.min(d.y));

        (
            Scale {
                domain: (-x_max, x_max),
                range: (MARGIN_LEFT, WIDTH - MARGIN_RIGHT),
            },
            Scale {
                domain: (y_min, y_max),
                range: (HEIGHT - MARGIN_BOTTOM, MARGIN_TOP),
            },
        )
    }

    /// Render the plot as an SVG document without XML declaration
    pub fn svg(&self) -> String {
        let (xs, ys) = self.scales();
        let (left, right) = xs.range;
        let (bottom, top) = ys.range;
        let radius = self.thresholds.point_radius;

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = WIDTH,
            h = HEIGHT
        ));
        svg.push_str("  <style>\n");
        svg.push_str("    text { font-family: sans-serif; font-size: 12px; fill: #444; }\n");
        svg.push_str("    .title { font-size: 16px; }\n");
        svg.push_str("    .guide { stroke: grey; stroke-width: 1; stroke-dasharray: 1,3; }\n");
        svg.push_str("    .axis { stroke: #444; stroke-width: 1; }\n");
        svg.push_str("  </style>\n");
        svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
        svg.push_str(&format!(
            "  <text class=\"title\" x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
            left,
            MARGIN_TOP / 2.0,
            escape(&self.title)
        ));

        // axes and ticks
        svg.push_str(&format!(
            "  <line class=\"axis\" x1=\"{l:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\"/>\n",
            l = left,
            r = right,
            b = bottom
        ));
        svg.push_str(&format!(
            "  <line class=\"axis\" x1=\"{l:.1}\" y1=\"{b:.1}\" x2=\"{l:.1}\" y2=\"{t:.1}\"/>\n",
            l = left,
            b = bottom,
            t = top
        ));
        for t in ticks(xs.domain.0, xs.domain.1) {
            let x = xs.map(t);
            svg.push_str(&format!(
                "  <line class=\"axis\" x1=\"{x:.1}\" y1=\"{b:.1}\" x2=\"{x:.1}\" y2=\"{e:.1}\"/>\n",
                x = x,
                b = bottom,
                e = bottom + 5.0
            ));
            svg.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
                x,
                bottom + 18.0,
                t
            ));
        }
        for t in ticks(ys.domain.0, ys.domain.1) {
            let y = ys.map(t);
            svg.push_str(&format!(
                "  <line class=\"axis\" x1=\"{l:.1}\" y1=\"{y:.1}\" x2=\"{e:.1}\" y2=\"{y:.1}\"/>\n",
                l = left,
                e = left - 5.0,
                y = y
            ));
            svg.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
                left - 8.0,
                y + 4.0,
                t
            ));
        }
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
            (left + right) / 2.0,
            HEIGHT - 15.0,
            X_AXIS_TITLE
        ));
        svg.push_str(&format!(
            "  <text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 {x:.1} {y:.1})\">{t}</text>\n",
            x = 20.0,
            y = (top + bottom) / 2.0,
            t = Y_AXIS_TITLE
        ));

        // dotted guides at the significance cutoffs
        let y = ys.map(self.thresholds.neg_log10_p);
        svg.push_str(&format!(
            "  <line class=\"guide\" x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\"/>\n",
            left,
            right,
            y = y
        ));
        for fc in [self.thresholds.fold_change, -self.thresholds.fold_change] {
            let x = xs.map(fc);
            svg.push_str(&format!(
                "  <line class=\"guide\" x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\"/>\n",
                bottom,
                top,
                x = x
            ));
        }

        svg.push_str("  <g>\n");
        for dot in &self.dots {
            svg.push_str(&format!(
                "    <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\"><title>{}</title></circle>\n",
                xs.map(dot.x),
                ys.map(dot.y),
                radius,
                dot.color.css(),
                escape(&dot.hover())
            ));
        }
        svg.push_str("  </g>\n");
        svg.push_str("</svg>\n");
        svg
    }

    pub fn html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body style=\"background: white\">\n{}</body>\n</html>\n",
            escape(&self.title),
            self.svg()
        )
    }

    /// Write `volcano_<title>.svg` and `volcano_<title>.html` into `dir`
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir.as_ref())?;
        let svg = dir.as_ref().join(format!("volcano_{}.svg", self.title));
        let html = dir.as_ref().join(format!("volcano_{}.html", self.title));
        fs::write(
            &svg,
            format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", self.svg()),
        )?;
        fs::write(&html, self.html())?;
        Ok((svg, html))
    }
}

/// Plot a statistics output file. The plot is titled after the file.
pub fn volcano_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    thresholds: Thresholds,
) -> Result<(PathBuf, PathBuf)> {
    let points = read_points(input.as_ref())?;
    let volcano = Volcano::new(file_stem(input.as_ref()), &points, thresholds);
    let (svg, html) = volcano.write(output_dir)?;
    tracing::info!(
        "plotted {} points to {} and {}",
        volcano.dots.len(),
        svg.display(),
        html.display()
    );
    Ok((svg, html))
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! point {
        ($acc:expr, $presence:expr, $fc:expr, $p:expr) => {
            Point {
                accession: $acc.into(),
                annotation: format!("{} & co", $acc),
                presence: $presence.into(),
                log2_fc: $fc,
                neg_log10_p: $p,
            }
        };
    }

    fn points() -> Vec<Point> {
        vec![
            point!("P1", "Both", Some(3.0), Some(4.0)),
            point!("P2", "Both", Some(-3.0), Some(4.0)),
            point!("P3", "Both", Some(3.0), Some(1.0)),
            point!("P4", "Only_exp", Some(1.0), Some(0.5)),
            point!("P5", "Both", Some(20.0), Some(5.0)),
            point!("P6", "Both", None, Some(5.0)),
            point!("P7", "Both", Some(1.0), Some(f64::INFINITY)),
            point!("P8", "Both", Some(2.0), Some(3.0)),
        ]
    }

    #[test]
    fn classify() {
        let t = Thresholds::default();
        let c = points()
            .iter()
            .map(|p| Color::classify(p, &t))
            .collect::<Vec<_>>();
        assert_eq!(
            &c[..5],
            &[
                Color::Up,
                Color::Down,
                Color::Neutral,
                Color::Exclusive,
                Color::Up
            ]
        );
        // the fold change cutoff is strict
        assert_eq!(c[7], Color::Neutral);
    }

    #[test]
    fn plotted_points() {
        let volcano = Volcano::new("test", &points(), Thresholds::default());
        let accs = volcano
            .dots
            .iter()
            .map(|d| d.accession.as_str())
            .collect::<Vec<_>>();
        assert_eq!(accs, vec!["P1", "P2", "P3", "P4", "P8"]);
    }

    #[test]
    fn tick_positions() {
        assert_eq!(ticks(-6.0, 6.0), vec![-6.0, -4.0, -2.0, 0.0, 2.0, 4.0, 6.0]);
        assert_eq!(ticks(0.0, 3.0), vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(ticks(1.0, 1.0), vec![1.0]);
    }

    #[test]
    fn render() {
        let volcano = Volcano::new("a<b", &points(), Thresholds::default());
        let svg = volcano.svg();
        assert_eq!(svg.matches("<circle").count(), 5);
        assert_eq!(svg.matches("class=\"guide\"").count(), 3);
        assert!(svg.contains("SPO: P1 | Annotation: P1 &amp; co"));
        assert!(svg.contains("fill=\"#006400\""));
        assert!(svg.contains(X_AXIS_TITLE));
        assert!(svg.contains("a&lt;b"));

        let html = volcano.html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(&svg));
    }

    #[test]
    fn write_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("PA14_LB_expVSstat_welch_None.txt");
        let mut header = (0..18).map(|i| format!("c{}", i)).collect::<Vec<_>>();
        header[9] = "Present_Only_In".into();
        header[14] = "Log2_Fold_Change".into();
        header[17] = "Log10_P_Values".into();
        let mut row = vec![String::from("0"); 18];
        row[0] = "P1".into();
        row[1] = "GAPDH".into();
        row[9] = "Both".into();
        row[14] = "2.5".into();
        row[17] = "3".into();
        let table = Table {
            header,
            rows: vec![row],
        };
        table.write(&input).unwrap();

        let out = dir.path().join("plots");
        let (svg, html) = volcano_file(&input, &out, Thresholds::default()).unwrap();
        assert_eq!(svg, out.join("volcano_PA14_LB_expVSstat_welch_None.svg"));
        assert_eq!(html, out.join("volcano_PA14_LB_expVSstat_welch_None.html"));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
        let pdf = out.join("volcano_PA14_LB_expVSstat_welch_None.pdf");
        assert!(!pdf.exists());
        let svg = fs::read_to_string(svg).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("fill=\"#FFA500\""));
    }
}
