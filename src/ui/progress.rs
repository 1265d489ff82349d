use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct ProgressManager {
    mp: MultiProgress,
    bars: Arc<Mutex<HashMap<String, ProgressBar>>>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            mp: MultiProgress::new(),
            bars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 创建新的进度条
    /// - `id`: 进度条唯一标识
    /// - `total`: 总步数 (e.g. SNR 点数)
    /// - `template`: 进度条模板
    pub fn create_bar(
        &self,
        id: &str,
        total: u64,
        template: &str,
        message: &str,
    ) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;

        if bars.contains_key(id) {
            return Err(format!("Progress bar '{}' already exists", id));
        }

        let style = ProgressStyle::default_bar()
            .template(template)
            .map_err(|e| format!("Bad template: {}", e))?
            .progress_chars("█▉▊▋▌▍▎▏ ");
        let pb = self
            .mp
            .add(ProgressBar::new(total));
        pb.set_style(style);
        pb.set_message(message.to_string());

        bars.insert(id.to_string(), pb);
        Ok(())
    }

    fn with_bar<T>(
        &self,
        id: &str,
        f: impl FnOnce(&ProgressBar) -> T,
    ) -> Result<T, String> {
        let bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        bars.get(id)
            .map(f)
            .ok_or_else(|| format!("Progress bar '{}' not found", id))
    }

    /// 增加进度条位置
    pub fn inc(&self, id: &str, value: u64) -> Result<(), String> {
        self.with_bar(id, |pb| pb.inc(value))
    }

    /// 更新进度条消息
    pub fn set_message(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.set_message(message.to_string()))
    }

    /// 完成进度条（保留显示）
    pub fn finish(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.finish_with_message(message.to_string()))
    }

    /// 清理所有进度条
    pub fn clear_all(&self) {
        if let Ok(mut bars) = self.bars.lock() {
            for (_, pb) in bars.drain() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

pub mod templates {
    pub const SWEEP: &str =
        "SNR  [{bar:30.cyan}] {pos}/{len} points {msg}";
}
