//! Prompt template loading convention for `runner`.
//!
//! C7 only specifies that it is handed `(prompt_template, context)` per
//! analysis; where templates come from is a CLI concern. `runner` reads one
//! file per analysis from a prompts directory (default `./prompts`):
//! `<prompts_dir>/<analysis>.txt`. A missing file is not fatal — the
//! orchestrator already falls back to a minimal generated template and
//! logs a warning (§4.7).

use std::collections::HashMap;
use std::path::Path;

use rumi_llm::ANALYSIS_ORDER;

pub async fn load_prompt_templates(prompts_dir: &Path) -> HashMap<String, String> {
    let mut templates = HashMap::new();
    for analysis in ANALYSIS_ORDER {
        let path = prompts_dir.join(format!("{analysis}.txt"));
        if let Ok(text) = tokio::fs::read_to_string(&path).await {
            templates.insert((*analysis).to_string(), text);
        }
    }
    templates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_prompts_dir_yields_empty_map() {
        let templates = load_prompt_templates(Path::new("/nonexistent/prompts")).await;
        assert!(templates.is_empty());
    }

    #[tokio::test]
    async fn present_template_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("creative_density.txt"), "analyze density").await.unwrap();
        let templates = load_prompt_templates(dir.path()).await;
        assert_eq!(templates.get("creative_density").map(String::as_str), Some("analyze density"));
    }
}
