//! Screen-space hit areas for menu and summary buttons

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Axis-aligned rectangle in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Rectangle of `size` centred horizontally on `center_x` with its top at `top`
    pub fn centered_x(center_x: f32, top: f32, size: Vec2) -> Self {
        Self::new(center_x - size.x / 2.0, top, size.x, size.y)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.min + self.size;
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }
}

/// Choices offered on the summary screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryChoice {
    Restart,
    Shop,
    Menu,
}

const SUMMARY_BUTTON_SIZE: Vec2 = Vec2::new(220.0, 50.0);

/// "Play" on the title screen
pub fn menu_play_button(config: &GameConfig) -> Rect {
    let center = config.screen_center();
    Rect::new(center.x - 100.0, center.y + 150.0, 200.0, 60.0)
}

/// Summary buttons, top to bottom
pub fn summary_buttons(config: &GameConfig) -> [(SummaryChoice, Rect); 3] {
    let center = config.screen_center();
    [
        (SummaryChoice::Restart, Rect::centered_x(center.x, center.y + 160.0, SUMMARY_BUTTON_SIZE)),
        (SummaryChoice::Shop, Rect::centered_x(center.x, center.y + 230.0, SUMMARY_BUTTON_SIZE)),
        (SummaryChoice::Menu, Rect::centered_x(center.x, center.y + 300.0, SUMMARY_BUTTON_SIZE)),
    ]
}

pub fn summary_choice_at(config: &GameConfig, point: Vec2) -> Option<SummaryChoice> {
    summary_buttons(config)
        .into_iter()
        .find(|(_, rect)| rect.contains(point))
        .map(|(choice, _)| choice)
}
