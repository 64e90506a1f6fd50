pub const IMAGE_EXTENSION: &str = "png";
pub const TEXT_EXTENSION: &str = "txt";

pub fn sanitize_title(title: &str) -> String {
    let kept = title
        .chars()
        .filter(|character| is_word_char(*character) || character.is_whitespace() || *character == '-')
        .collect::<String>();

    let mut out = kept
        .trim()
        .to_lowercase()
        .chars()
        .map(|character| if character.is_whitespace() { '_' } else { character })
        .collect::<String>();

    while out.contains("__") {
        out = out.replace("__", "_");
    }

    format!("{out}.{IMAGE_EXTENSION}")
}

pub fn text_filename_for(image_filename: &str) -> String {
    let base = image_filename
        .strip_suffix(&format!(".{IMAGE_EXTENSION}"))
        .unwrap_or(image_filename);
    format!("{base}.{TEXT_EXTENSION}")
}

fn is_word_char(character: char) -> bool {
    character.is_alphanumeric() || character == '_'
}
