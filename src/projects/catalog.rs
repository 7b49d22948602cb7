//! The fixed model catalog. New projects take the first entry.

use super::types::{ModelOption, Provider};

struct CatalogEntry {
    provider: Provider,
    id: &'static str,
    label: &'static str,
    context_window: u32,
    description: &'static str,
}

const fn entry(
    provider: Provider,
    id: &'static str,
    label: &'static str,
    context_window: u32,
    description: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        provider,
        id,
        label,
        context_window,
        description,
    }
}

use Provider::{Aws, Google, Meta, OpenAI};

const CATALOG: &[CatalogEntry] = &[
    // AWS
    entry(Aws, "claude3_opus", "Claude 3 Opus", 200_000, "High cost, with most advanced intelligence"),
    entry(Aws, "llama3-405b", "Llama 3 405B", 128_000, "High-capacity reasoning"),
    entry(Aws, "nova-pro", "Nova Pro", 300_000, "General-purpose multimodal model"),
    entry(Aws, "llama3_2-3b", "Llama 3.2 3B", 128_000, "Efficient chat model"),
    entry(Aws, "claude2_1", "Claude 2.1", 100_000, "Stable general-purpose chat"),
    entry(Aws, "claude3_sonnet", "Claude 3 Sonnet", 200_000, "Recommended for creative tasks"),
    entry(Aws, "nova-lite", "Nova Lite", 300_000, "Efficient multimodal text & vision"),
    entry(Aws, "nova-micro", "Nova Micro", 128_000, "Low-latency text completions"),
    entry(Aws, "mistral-7b", "Mistral 7B", 8_000, "Efficient general-purpose text"),
    entry(Aws, "llama3_2-90b", "Llama 3.2 90B", 128_000, "Multimodal vision & chat"),
    entry(Aws, "llama3-70b", "Llama 3 70B", 128_000, "High-quality text generation"),
    entry(Aws, "llama3-8b", "Llama 3 8B", 128_000, "Balanced chat performance"),
    entry(Aws, "claude3_haiku", "Claude 3 Haiku", 200_000, "Fast, low-latency tasks"),
    entry(Aws, "mistral-large", "Mistral Large", 128_000, "High-quality text modeling"),
    entry(Aws, "claudeinstant", "Claude Instant", 100_000, "Fast chat & QA"),
    entry(Aws, "claude3_7_sonnet", "Claude 3.7 Sonnet", 200_000, "Advanced creative and coding tasks"),
    entry(Aws, "claude2", "Claude 2", 100_000, "General-purpose chat"),
    entry(Aws, "llama3_2-1b", "Llama 3.2 1B", 128_000, "Lightweight chat model"),
    entry(Aws, "titang1lite", "Titan G1 Lite", 4_000, "Lightweight text tasks"),
    entry(Aws, "titang1express", "Titan G1 Express", 8_000, "Express embeddings"),
    entry(Aws, "mistral-8x7b", "Mistral 8x7B", 128_000, "Ensemble efficiency"),
    entry(Aws, "claude3_5_sonnet", "Claude 3.5 Sonnet", 200_000, "High-speed intelligent tasks"),
    entry(Aws, "llama3_2-11b", "Llama 3.2 11B", 128_000, "Vision-enabled chat"),
    // OpenAI
    entry(OpenAI, "o1", "O1", 200_000, "Recommended for reasoning"),
    entry(OpenAI, "gpt4-32k", "GPT-4 32K", 32_000, "Large context comprehension"),
    entry(OpenAI, "gpt3_5-16k", "GPT-3.5 Turbo 16K", 16_000, "Extended context chat"),
    entry(OpenAI, "o3-mini", "O3 Mini", 200_000, "Fast reasoning & chat"),
    entry(OpenAI, "o3", "O3", 200_000, "Recommended for complex reasoning"),
    entry(OpenAI, "gpt4_1-nano", "GPT-4.1 Nano", 1_000_000, "Compact multimodal chat"),
    entry(OpenAI, "gpt4_1", "GPT-4.1", 1_000_000, "Vision-enabled GPT-4"),
    entry(OpenAI, "gpt4_1-mini", "GPT-4.1 Mini", 1_000_000, "Great for quick coding and analysis"),
    entry(OpenAI, "gpt4o_mini", "GPT-4o Mini", 128_000, "Cost effective for most tasks"),
    entry(OpenAI, "gpt4o", "GPT-4o", 128_000, "Great for most tasks"),
    entry(OpenAI, "gpt4turbo", "GPT-4 Turbo", 128_000, "Optimized GPT-4"),
    entry(OpenAI, "gpt3_5", "GPT-3.5 Turbo", 4_000, "Efficient chat model"),
    entry(OpenAI, "o4-mini", "O4 Mini", 200_000, "Cost-efficient reasoning"),
    // Google (Gemini API)
    entry(Google, "gemini-2.5-flash", "Gemini 2.5 Flash", 1_000_000, "Adaptive thinking, cost efficiency"),
    entry(Google, "gemini-2.0-flash", "Gemini 2.0 Flash", 1_000_000, "Next generation features, speed, and realtime streaming"),
    entry(Google, "gemini-2.0-flash-lite", "Gemini 2.0 Flash-Lite", 1_000_000, "Cost efficiency and low latency"),
    // Meta (Llama API)
    entry(Meta, "Llama-4-Maverick-17B-128E-Instruct-FP8", "Llama 4 Maverick 17B", 128_000, "Industry-leading multimodal model with 128 experts"),
    entry(Meta, "Llama-4-Scout-17B-16E-Instruct-FP8", "Llama 4 Scout 17B", 128_000, "Class-leading multimodal model with superior intelligence"),
];

impl CatalogEntry {
    fn to_option(&self) -> ModelOption {
        ModelOption {
            provider: self.provider,
            id: self.id.to_string(),
            label: self.label.to_string(),
            context_window: self.context_window,
            description: self.description.to_string(),
        }
    }
}

/// Every catalog entry, in display order.
pub fn model_catalog() -> Vec<ModelOption> {
    CATALOG.iter().map(CatalogEntry::to_option).collect()
}

/// The model new projects start with: the catalog's first entry.
pub fn default_model() -> ModelOption {
    CATALOG[0].to_option()
}

pub fn find_model(id: &str) -> Option<ModelOption> {
    CATALOG.iter().find(|e| e.id == id).map(CatalogEntry::to_option)
}

/// Best catalog match for a provider/model name pair taken from a template.
///
/// Both sides are matched by case-insensitive substring: the provider against
/// the catalog provider label, the model name against id or label.
pub fn pick_model(provider: Option<&str>, model_name: Option<&str>) -> Option<ModelOption> {
    let provider = provider.filter(|p| !p.is_empty());
    let model_name = model_name.filter(|m| !m.is_empty());
    if provider.is_none() && model_name.is_none() {
        return None;
    }
    let prov = provider.unwrap_or_default().to_lowercase();
    let name = model_name.unwrap_or_default().to_lowercase();

    CATALOG
        .iter()
        .find(|e| {
            (prov.is_empty() || e.provider.as_str().to_lowercase().contains(&prov))
                && (name.is_empty()
                    || e.id.to_lowercase().contains(&name)
                    || e.label.to_lowercase().contains(&name))
        })
        .map(CatalogEntry::to_option)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_first_entry() {
        let model = default_model();
        assert_eq!(model.id, "claude3_opus");
        assert_eq!(model.provider, Provider::Aws);
        assert_eq!(model_catalog()[0], model);
    }

    #[test]
    fn catalog_ids_are_unique() {
        let catalog = model_catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn pick_model_matches_label_substring() {
        let model = pick_model(Some("OpenAI"), Some("gpt-4o")).unwrap();
        assert_eq!(model.id, "gpt4o_mini");
        assert!(pick_model(None, None).is_none());
        assert!(pick_model(Some("Groq"), Some("mixtral")).is_none());
    }

    #[test]
    fn find_model_by_id() {
        assert_eq!(find_model("gemini-2.0-flash").unwrap().provider, Provider::Google);
        assert!(find_model("nope").is_none());
    }
}
