use eframe::egui;
use shared::domain::Verdict;

pub const DANGER: egui::Color32 = egui::Color32::from_rgb(220, 53, 69);
pub const SUCCESS: egui::Color32 = egui::Color32::from_rgb(25, 135, 84);
const BRAND_LIGHT: egui::Color32 = egui::Color32::from_rgb(13, 110, 253);
const BRAND_DARK: egui::Color32 = egui::Color32::from_rgb(108, 117, 125);

pub fn visuals(dark_mode: bool) -> egui::Visuals {
    if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    }
}

/// Bar colour for the header and footer.
pub fn brand_fill(dark_mode: bool) -> egui::Color32 {
    if dark_mode {
        BRAND_DARK
    } else {
        BRAND_LIGHT
    }
}

pub fn drop_zone_fill(dark_mode: bool, dragging: bool) -> egui::Color32 {
    match (dragging, dark_mode) {
        (true, _) => BRAND_DARK,
        (false, true) => egui::Color32::from_gray(32),
        (false, false) => egui::Color32::from_gray(248),
    }
}

/// Only "Fake" is flagged; every other verdict renders as a pass.
pub fn verdict_fill(verdict: &Verdict) -> egui::Color32 {
    if verdict.is_fake() {
        DANGER
    } else {
        SUCCESS
    }
}

pub fn verdict_icon(verdict: &Verdict) -> &'static str {
    if verdict.is_fake() {
        "✖"
    } else {
        "✔"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fake_is_rendered_as_danger() {
        assert_eq!(verdict_fill(&Verdict::Fake), DANGER);
        assert_eq!(verdict_fill(&Verdict::Real), SUCCESS);
        assert_eq!(
            verdict_fill(&Verdict::Unrecognized("Error: Could not read image".into())),
            SUCCESS
        );
    }

    #[test]
    fn dragging_overrides_theme_fill() {
        assert_eq!(drop_zone_fill(true, true), drop_zone_fill(false, true));
        assert_ne!(drop_zone_fill(false, false), drop_zone_fill(false, true));
    }
}
