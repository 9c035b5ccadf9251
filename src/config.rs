use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_CHECK_DELAY_MS: u64 = 150;

/// User-visible strings. Defaults are the Turkish strings the quiz pages ship with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub toolbar_title: String,
    pub check_all: String,
    pub check_all_hint: String,
    pub reset: String,
    pub reset_hint: String,
    pub hide: String,
    pub show: String,
    pub check_hint: String,
    /// Prefix of the `aria-label` given to answer text areas; the field number is appended.
    pub answer_field: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            toolbar_title: "Test Yardımcısı".to_string(),
            check_all: "Tümünü Kontrol Et".to_string(),
            check_all_hint: "Tüm soruları kontrol et".to_string(),
            reset: "Temizle".to_string(),
            reset_hint: "Geri al (feedbackleri temizle)".to_string(),
            hide: "Gizle".to_string(),
            show: "Göster".to_string(),
            check_hint: "Bu soruyu kontrol et (Ctrl+Enter ile de çalışır)".to_string(),
            answer_field: "Cevap yazma alanı".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnhancerOptions {
    /// Delay between a per-question check click and scrolling to its feedback. Must outlast
    /// the page's checker so the feedback is populated before it is revealed.
    pub check_delay_ms: u64,
    pub labels: Labels,
}

impl Default for EnhancerOptions {
    fn default() -> Self {
        Self {
            check_delay_ms: DEFAULT_CHECK_DELAY_MS,
            labels: Labels::default(),
        }
    }
}

impl EnhancerOptions {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }

    pub fn check_delay(&self) -> Duration {
        Duration::from_millis(self.check_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options: EnhancerOptions =
            serde_json::from_str(r#"{"labels": {"hide": "Hide", "show": "Show"}}"#).unwrap();
        assert_eq!(options.check_delay_ms, DEFAULT_CHECK_DELAY_MS);
        assert_eq!(options.labels.hide, "Hide");
        assert_eq!(options.labels.reset, "Temizle");
        assert_eq!(options.check_delay(), Duration::from_millis(150));
    }
}
