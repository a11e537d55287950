use nu_ansi_term::{Color, Style};
use plantree::{NodeId, PlanForest, PlanNode};
use std::fmt::{Display, Write as _};
use std::io::IsTerminal;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

pub struct Ui {
    palette: Palette,
    paint: bool,
    quiet: bool,
}

impl Ui {
    pub fn new(theme: Theme, quiet: bool) -> Self {
        let stdout_is_tty = std::io::stdout().is_terminal();
        let paint = match theme {
            Theme::Plain => false,
            Theme::Auto => stdout_is_tty,
            Theme::Light | Theme::Dark => stdout_is_tty,
        } && !quiet;

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        let palette = match theme {
            Theme::Plain => Palette::plain(),
            Theme::Light => Palette::light(),
            Theme::Dark | Theme::Auto => Palette::dark(),
        };

        Self {
            palette,
            paint,
            quiet,
        }
    }

    pub fn section<'a, I, V>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        let rows: Vec<(String, String)> = rows
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        if rows.is_empty() {
            return;
        }

        self.heading(title);
        let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            if self.paint {
                println!(
                    "  {} {}",
                    self.palette.key.paint(format!("{key:>key_width$}:")),
                    self.palette.value.paint(value)
                );
            } else {
                println!("  {key:>key_width$}: {value}");
            }
        }
    }

    /// Prints every root of `forest` as an indented outline.
    pub fn plan(&self, title: &str, forest: &PlanForest) {
        self.heading(title);
        if forest.is_empty() {
            println!("  (no plan steps)");
            return;
        }
        for root in forest.roots() {
            forest.walk(*root, |id, depth| println!("{}", self.plan_line(forest, id, depth)));
        }
    }

    fn plan_line(&self, forest: &PlanForest, id: NodeId, depth: usize) -> String {
        let mut line = "  ".repeat(depth + 1);
        match forest.node(id) {
            PlanNode::Join { .. } => {
                let _ = write!(line, "{}", self.paint_with(self.palette.join, "Join"));
            }
            PlanNode::Leaf { step } => {
                let step = forest.step(*step);
                let _ = write!(line, "{}", self.paint_with(self.palette.step, "Step"));
                for (name, value) in step.columns() {
                    if value.is_null() {
                        continue;
                    }
                    let _ = write!(
                        line,
                        " {}={}",
                        self.paint_with(self.palette.key, name),
                        self.paint_with(self.palette.value, &value.to_string())
                    );
                }
            }
        }
        line
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.paint_with(self.palette.info, INFO_ICON);
        println!("{prefix} {message}");
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            println!("{message}");
            return;
        }
        let prefix = self.paint_with(self.palette.success, SUCCESS_ICON);
        println!("{prefix} {message}");
    }

    fn paint_with(&self, style: Style, text: &str) -> String {
        if self.paint {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, title: &str) {
        if self.quiet {
            return;
        }
        let formatted = format!("{HEADING_ICON} {title}");
        println!("{}", self.paint_with(self.palette.heading, &formatted));
    }
}

#[derive(Clone, Copy)]
struct Palette {
    heading: Style,
    key: Style,
    value: Style,
    join: Style,
    step: Style,
    info: Style,
    success: Style,
}

impl Palette {
    fn dark() -> Self {
        Self {
            heading: Style::new().fg(Color::Purple).bold(),
            key: Style::new().fg(Color::LightBlue),
            value: Style::new().fg(Color::White),
            join: Style::new().fg(Color::Yellow).bold(),
            step: Style::new().fg(Color::LightGreen).bold(),
            info: Style::new().fg(Color::LightCyan),
            success: Style::new().fg(Color::LightGreen).bold(),
        }
    }

    fn light() -> Self {
        Self {
            heading: Style::new().fg(Color::Blue).bold(),
            key: Style::new().fg(Color::Blue),
            value: Style::new().fg(Color::Black),
            join: Style::new().fg(Color::Red).bold(),
            step: Style::new().fg(Color::Green).bold(),
            info: Style::new().fg(Color::Purple),
            success: Style::new().fg(Color::Green).bold(),
        }
    }

    fn plain() -> Self {
        Self {
            heading: Style::new(),
            key: Style::new(),
            value: Style::new(),
            join: Style::new(),
            step: Style::new(),
            info: Style::new(),
            success: Style::new(),
        }
    }
}

const HEADING_ICON: &str = "▸";
const INFO_ICON: &str = "ℹ";
const SUCCESS_ICON: &str = "✔";
