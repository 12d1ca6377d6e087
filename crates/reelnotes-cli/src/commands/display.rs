use comfy_table::{Attribute, Cell, Color, Table};
use movie_data_models::{MovieWithReviews, MyReviewRecord, SearchMovieWithMyReview};
use owo_colors::OwoColorize;

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn own_review_cell(review: Option<&MyReviewRecord>) -> Cell {
    match review {
        Some(review) => Cell::new(format!("{}/10", review.rating)).fg(Color::Green),
        None => Cell::new("-"),
    }
}

pub fn search_table(results: &[SearchMovieWithMyReview]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Year").add_attribute(Attribute::Bold),
        Cell::new("Rating").add_attribute(Attribute::Bold),
        Cell::new("My review").add_attribute(Attribute::Bold),
    ]);

    for result in results {
        table.add_row(vec![
            Cell::new(result.movie.id),
            Cell::new(&result.movie.title),
            Cell::new(result.movie.release_year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(format!("{:.1}", result.movie.rating)),
            own_review_cell(result.my_review.as_ref()),
        ]);
    }
    table
}

pub fn movie_details(combined: &MovieWithReviews) -> String {
    let movie = &combined.movie;
    let mut out = String::new();

    let year = movie.release_year().map(|y| format!(" ({})", y)).unwrap_or_default();
    out.push_str(&format!("\n{}{}\n", movie.title.bright_cyan().bold(), year));

    let mut facts = styled_table();
    facts.add_row(vec![Cell::new("Rating"), Cell::new(format!("{:.1}", movie.rating))]);
    facts.add_row(vec![Cell::new("Runtime"), Cell::new(format!("{} min", movie.duration_minutes))]);
    facts.add_row(vec![Cell::new("Genres"), Cell::new(&movie.genres)]);
    if let Some(poster) = &movie.poster_url {
        facts.add_row(vec![Cell::new("Poster"), Cell::new(poster)]);
    }
    out.push_str(&format!("{}\n", facts));

    if !movie.overview.is_empty() {
        out.push_str(&format!("\n{}\n", movie.overview));
    }

    out.push_str(&format!("\n{}\n", "Your review".bold()));
    match &combined.my_review {
        Some(review) => out.push_str(&format!("  {}/10  {}\n", review.rating, review.text)),
        None => out.push_str(&format!("  {}\n", "You have not reviewed this movie".bright_black())),
    }

    out.push_str(&format!(
        "\n{} ({})\n",
        "Other reviews".bold(),
        combined.someone_else_reviews.len()
    ));
    if !combined.someone_else_reviews.is_empty() {
        let mut reviews = styled_table();
        reviews.set_header(vec![
            Cell::new("Author").add_attribute(Attribute::Bold),
            Cell::new("Rating").add_attribute(Attribute::Bold),
            Cell::new("Review").add_attribute(Attribute::Bold),
        ]);
        for review in &combined.someone_else_reviews {
            reviews.add_row(vec![
                Cell::new(&review.author_name),
                Cell::new(review.rating.map(|r| format!("{}/10", r)).unwrap_or_else(|| "-".to_string())),
                Cell::new(&review.text),
            ]);
        }
        out.push_str(&format!("{}\n", reviews));
    }
    out
}

/// Show the first and last four characters of a secret
pub fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("short"), "*****");
        assert_eq!(mask_string("abcd1234efgh"), "abcd****efgh");
    }
}
