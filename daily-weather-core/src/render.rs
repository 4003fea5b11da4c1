//! Rendering a [`WeatherReport`] into note blocks.

use serde::{Deserialize, Serialize};

use crate::model::{Units, WeatherReport};

/// Title of the root block every report hangs under.
pub const ROOT_TITLE: &str = "[[Daily Weather]]";

/// Which optional sections to emit, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub use_single_block: bool,
    pub include_location: bool,
    pub include_sun: bool,
    pub include_moon: bool,
    pub include_wind: bool,
    pub include_humidity: bool,
    pub units: Units,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            use_single_block: false,
            include_location: true,
            include_sun: true,
            include_moon: true,
            include_wind: true,
            include_humidity: true,
            units: Units::default(),
        }
    }
}

/// One block to insert. Leaves have no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderNode {
    pub text: String,
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }
}

/// Render the report as either one parent block with a child per property, or
/// a single block holding every line.
///
/// Property order is fixed: forecast, temperature, humidity, wind, sun, moon,
/// location. Disabled sections and sections without data are skipped.
pub fn render(report: &WeatherReport, config: &RenderConfig) -> Vec<RenderNode> {
    let lines = property_lines(report, config);

    if config.use_single_block {
        let mut text = String::from(ROOT_TITLE);
        for line in &lines {
            text.push('\n');
            text.push_str(line);
        }
        return vec![RenderNode::leaf(text)];
    }

    vec![RenderNode {
        text: ROOT_TITLE.to_string(),
        children: lines.into_iter().map(RenderNode::leaf).collect(),
    }]
}

fn property_lines(report: &WeatherReport, config: &RenderConfig) -> Vec<String> {
    let mut lines = vec![
        property("forecast", &report.forecast),
        property("temperature", &report.temperature),
    ];

    if config.include_humidity {
        if let Some(humidity) = &report.humidity {
            lines.push(property("humidity", humidity));
        }
    }

    if config.include_wind {
        if let Some(wind) = &report.wind {
            lines.push(property("wind", wind));
        }
    }

    if config.include_sun {
        if let Some(sun) = &report.sun {
            lines.push(property("sun", sun));
        }
    }

    if config.include_moon {
        if let Some(moon) = &report.moon {
            lines.push(property("moon", moon));
        }
    }

    if config.include_location {
        if let Some(places) = report.location.as_deref().filter(|p| !p.is_empty()) {
            let links = places
                .iter()
                .map(|p| format!("[[{p}]]"))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(property("location", links));
        }
    }

    lines
}

fn property(name: &str, value: impl std::fmt::Display) -> String {
    format!("{name}:: {value}")
}
