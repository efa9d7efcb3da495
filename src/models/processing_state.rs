use tracing::info;

/// 处理进度状态（只用于展示）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingState {
    pub is_processing: bool,
    pub status: String,
    pub error: Option<String>,
    pub partial_errors: Vec<String>,
}

impl ProcessingState {
    /// 开始新一轮处理，清空上一轮的错误
    pub fn begin(&mut self, status: impl Into<String>) {
        *self = Self {
            is_processing: true,
            ..Self::default()
        };
        self.set_status(status);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        info!("⏳ {}", self.status);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.is_processing = false;
    }

    pub fn add_partial_errors(&mut self, errors: impl IntoIterator<Item = String>) {
        self.partial_errors.extend(errors);
    }

    /// 处理成功结束，记录最终状态
    pub fn finish(&mut self, status: impl Into<String>) {
        self.set_status(status);
        self.is_processing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_clears_previous_run() {
        let mut state = ProcessingState::default();
        state.begin("primera");
        state.add_partial_errors(vec!["lote".to_string()]);
        state.fail("fatal");

        state.begin("segunda");
        assert!(state.is_processing);
        assert_eq!(state.status, "segunda");
        assert!(state.error.is_none());
        assert!(state.partial_errors.is_empty());
    }

    #[test]
    fn test_finish_keeps_final_status() {
        let mut state = ProcessingState::default();
        state.begin("Generando 5 preguntas...");
        state.finish("Cuestionario generado con 5 preguntas.");

        assert!(!state.is_processing);
        assert_eq!(state.status, "Cuestionario generado con 5 preguntas.");
        assert!(state.error.is_none());
    }
}
