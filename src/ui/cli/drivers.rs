use anyhow::Result;
use inquire::validator::Validation;
use inquire::{Confirm, CustomType, Select, Text};

/// Source of answers for the wizard. The terminal implementation is
/// [`InquireDriver`]; tests script their own.
pub trait PromptDriver {
    fn ask_string(&self, title: &str, help: &str, default: &str) -> Result<String>;

    fn ask_bool(&self, title: &str, help: &str, default: bool) -> Result<bool>;

    fn ask_u64(
        &self,
        title: &str,
        help: &str,
        default: u64,
        min: Option<u64>,
        max: Option<u64>,
    ) -> Result<u64>;

    fn ask_f64(
        &self,
        title: &str,
        help: &str,
        default: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<f64>;

    /// Index into `options` of the picked entry.
    fn ask_select(&self, title: &str, help: &str, options: Vec<String>, start: usize)
    -> Result<usize>;
}

pub struct InquireDriver;

fn check_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: Option<T>,
    max: Option<T>,
) -> Validation {
    match (min, max) {
        (Some(lo), _) if value < lo => Validation::Invalid(format!("must be >= {lo}").into()),
        (_, Some(hi)) if value > hi => Validation::Invalid(format!("must be <= {hi}").into()),
        _ => Validation::Valid,
    }
}

impl PromptDriver for InquireDriver {
    fn ask_string(&self, title: &str, help: &str, default: &str) -> Result<String> {
        let mut prompt = Text::new(title).with_default(default);
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        Ok(prompt.prompt()?)
    }

    fn ask_bool(&self, title: &str, help: &str, default: bool) -> Result<bool> {
        let mut prompt = Confirm::new(title).with_default(default);
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        Ok(prompt.prompt()?)
    }

    fn ask_u64(
        &self,
        title: &str,
        help: &str,
        default: u64,
        min: Option<u64>,
        max: Option<u64>,
    ) -> Result<u64> {
        let mut prompt = CustomType::<u64>::new(title)
            .with_default(default)
            .with_error_message("Please type a non-negative integer")
            .with_validator(move |v: &u64| Ok(check_range(*v, min, max)));
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        Ok(prompt.prompt()?)
    }

    fn ask_f64(
        &self,
        title: &str,
        help: &str,
        default: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<f64> {
        let mut prompt = CustomType::<f64>::new(title)
            .with_default(default)
            .with_error_message("Please type a number")
            .with_validator(move |v: &f64| Ok(check_range(*v, min, max)));
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        Ok(prompt.prompt()?)
    }

    fn ask_select(
        &self,
        title: &str,
        help: &str,
        options: Vec<String>,
        start: usize,
    ) -> Result<usize> {
        let start = start.min(options.len().saturating_sub(1));
        let mut prompt = Select::new(title, options).with_starting_cursor(start);
        if !help.is_empty() {
            prompt = prompt.with_help_message(help);
        }
        Ok(prompt.raw_prompt()?.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check_is_inclusive() {
        assert!(matches!(check_range(1u64, Some(1), Some(4)), Validation::Valid));
        assert!(matches!(check_range(4u64, Some(1), Some(4)), Validation::Valid));
        assert!(matches!(check_range(0.5, None, None), Validation::Valid));
        assert!(matches!(check_range(0u64, Some(1), None), Validation::Invalid(_)));
        assert!(matches!(check_range(1.5, Some(0.0), Some(1.0)), Validation::Invalid(_)));
    }
}
