// CSV deck output
use super::Card;
use crate::error::Result;
use crate::translate::language_name;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Column names for a deck, e.g. `Spanish, English[, Image]`.
pub fn header(source_lang: &str, target_lang: &str, with_images: bool) -> Vec<String> {
    let mut columns = vec![
        language_name(source_lang).unwrap_or(source_lang).to_string(),
        language_name(target_lang).unwrap_or(target_lang).to_string(),
    ];
    if with_images {
        columns.push("Image".to_string());
    }
    columns
}

/// Write the header and one record per card to any writer.
pub fn write_cards_to<W: Write>(writer: W, header: &[String], cards: &[Card]) -> Result<()> {
    let mut wtr = ::csv::Writer::from_writer(writer);
    wtr.write_record(header)?;

    for card in cards {
        match &card.image_reference {
            Some(image) => wtr.write_record([
                card.source_text.as_str(),
                card.translated_text.as_str(),
                image.as_str(),
            ])?,
            None => wtr.write_record([card.source_text.as_str(), card.translated_text.as_str()])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Write the deck to `path`, replacing any existing file.
pub fn write_cards(path: &Path, header: &[String], cards: &[Card]) -> Result<()> {
    let file = File::create(path)?;
    write_cards_to(file, header, cards)?;
    debug!("Wrote {} cards to {}", cards.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(source: &str, target: &str, image: Option<&str>) -> Card {
        Card {
            source_text: source.to_string(),
            translated_text: target.to_string(),
            image_reference: image.map(str::to_string),
        }
    }

    fn render(header: &[String], cards: &[Card]) -> Vec<String> {
        let mut buf = Vec::new();
        write_cards_to(&mut buf, header, cards).unwrap();
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_header() {
        assert_eq!(header("es", "en", false), vec!["Spanish", "English"]);
        assert_eq!(header("es", "en", true), vec!["Spanish", "English", "Image"]);
        assert_eq!(header("xx", "en", false), vec!["xx", "English"]);
    }

    #[test]
    fn test_write_two_columns() {
        let lines = render(
            &header("es", "en", false),
            &[card("Hola mundo", "Hello world", None)],
        );
        assert_eq!(lines, vec!["Spanish,English", "Hola mundo,Hello world"]);
    }

    #[test]
    fn test_write_with_images_and_quoting() {
        let lines = render(
            &header("es", "en", true),
            &[card(
                "Hola, ¿cómo estás?",
                "Hello, how are you?",
                Some("<img src='ep1-0001.jpg'>"),
            )],
        );
        assert_eq!(lines[0], "Spanish,English,Image");
        assert_eq!(
            lines[1],
            "\"Hola, ¿cómo estás?\",\"Hello, how are you?\",<img src='ep1-0001.jpg'>"
        );
    }

    #[test]
    fn test_write_cards_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.csv");
        write_cards(&path, &header("es", "en", false), &[card("Sí", "Yes", None)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Spanish,English"));
        assert!(content.contains("Sí,Yes"));
    }
}
