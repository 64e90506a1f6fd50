use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Block {
    Bullet(String),
    Paragraph(String),
}

pub fn format_description(text: &str) -> Vec<Block> {
    text.trim()
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            if let Some(rest) = line.strip_prefix('•').or_else(|| line.strip_prefix('-')) {
                Some(Block::Bullet(rest.trim().to_string()))
            } else if line.is_empty() {
                None
            } else {
                Some(Block::Paragraph(line.to_string()))
            }
        })
        .collect()
}

pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Bullet(text) => {
                out.push_str("• ");
                out.push_str(text);
                out.push('\n');
            }
            Block::Paragraph(text) => {
                out.push_str(text);
                out.push_str("\n\n");
            }
        }
    }
    out
}

pub fn not_found_message(query: &str) -> String {
    format!("No match found for '{query}'.")
}

pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for character in text.chars() {
        if character.is_alphabetic() {
            if previous_is_letter {
                out.extend(character.to_lowercase());
            } else {
                out.extend(character.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(character);
            previous_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullets_and_paragraphs_are_separated() {
        let blocks = format_description(
            "\nOpen the Inventory tab.\n\n• Pick a product\n- Set the minimum\n   \nSave.\n",
        );
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("Open the Inventory tab.".to_string()),
                Block::Bullet("Pick a product".to_string()),
                Block::Bullet("Set the minimum".to_string()),
                Block::Paragraph("Save.".to_string()),
            ]
        );
    }

    #[test]
    fn rendered_text_marks_bullets() {
        let rendered = render_blocks(&[
            Block::Paragraph("Intro".to_string()),
            Block::Bullet("step".to_string()),
        ]);
        assert_eq!(rendered, "Intro\n\n• step\n");
    }

    #[test]
    fn empty_description_has_no_blocks() {
        assert!(format_description("  \n ").is_empty());
    }

    #[test]
    fn not_found_echoes_raw_query() {
        assert_eq!(
            not_found_message("How to FLY?"),
            "No match found for 'How to FLY?'."
        );
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("LOW STOCK ALERTS"), "Low Stock Alerts");
        assert_eq!(title_case("SET-UP 2ND PRINTER"), "Set-Up 2Nd Printer");
    }
}
