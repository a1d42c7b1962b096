use crate::algo::item::Item;

/// Build the lowercase search text for one item: glyph, meaning gloss, every
/// example word, then every example gloss, space-separated.
pub fn search_text(item: &Item) -> String {
    let words: Vec<&str> = item
        .examples
        .iter()
        .map(|ex| ex.word.as_str())
        .filter(|w| !w.is_empty())
        .collect();
    let glosses: Vec<&str> = item
        .examples
        .iter()
        .map(|ex| ex.gloss.as_str())
        .filter(|g| !g.is_empty())
        .collect();
    let words = words.join(" ");
    let glosses = glosses.join(" ");

    [
        item.character.as_str(),
        item.meaning.as_str(),
        words.as_str(),
        glosses.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

/// The narrower text the fallback tiers look at: the meaning gloss alone.
pub fn gloss_text(item: &Item) -> String {
    item.meaning.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_all_fields_lowercase() {
        let item = Item::new(1, "法", "Law, Method")
            .with_example("法律", "Legislation")
            .with_example("方法", "method");
        assert_eq!(search_text(&item), "法 law, method 法律 方法 legislation method");
    }

    #[test]
    fn missing_fields_become_empty() {
        let item = Item::new(2, "", "");
        assert_eq!(search_text(&item), "   ");
    }

    #[test]
    fn gloss_text_skips_examples() {
        let item = Item::new(3, "雪", "Snow").with_example("雪国", "snow country");
        assert_eq!(gloss_text(&item), "snow");
    }
}
