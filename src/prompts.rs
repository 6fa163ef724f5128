pub const CAPTION_BASE: &str = include_str!("../data/prompts/caption_base.txt");
pub const CAPTION_KEYWORDS: &str = include_str!("../data/prompts/caption_keywords.txt");
pub const CAPTION_CONSTRAINTS: &str = include_str!("../data/prompts/caption_constraints.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Build the caption instruction sent alongside the image.
///
/// Keywords are listed in the order given. The output depends only on
/// `keywords`, so equal inputs always produce byte-identical prompts.
pub fn build(keywords: &[String]) -> String {
    let mut prompt = CAPTION_BASE.trim().to_string();

    if !keywords.is_empty() {
        let keywords_str = keywords.join(", ");
        prompt.push(' ');
        prompt.push_str(&render(
            CAPTION_KEYWORDS.trim(),
            &[("keywords", &keywords_str)],
        ));
    }

    prompt.push(' ');
    prompt.push_str(CAPTION_CONSTRAINTS.trim());
    prompt
}
