//! Budget split between the book description and the author bio
//!
//! A shared character budget is divided proportionally to the natural
//! lengths of the two fields, clamped so one very long field cannot starve
//! the other down to nothing.

use crate::content::truncate_markup;
use flyer_types::ContentBudget;

/// Split `budget.total_chars` between the two fragments and truncate each
/// side to its share. Inputs that already fit are returned unchanged
/// without any markup rewriting.
pub fn balance_content(book: &str, author: &str, budget: &ContentBudget) -> (String, String) {
    let book_len = book.chars().count();
    let author_len = author.chars().count();
    let total_len = book_len + author_len;

    if total_len <= budget.total_chars {
        return (book.to_string(), author.to_string());
    }

    if book_len == 0 {
        return (
            String::new(),
            truncate_markup(author, budget.total_chars),
        );
    }
    if author_len == 0 {
        return (
            truncate_markup(book, budget.total_chars),
            String::new(),
        );
    }

    let book_ratio =
        (book_len as f64 / total_len as f64).clamp(budget.min_ratio, budget.max_ratio);

    // Integer split, remainder to the author side
    let book_chars = (budget.total_chars as f64 * book_ratio) as usize;
    let author_chars = budget.total_chars - book_chars;

    (
        truncate_markup(book, book_chars),
        truncate_markup(author, author_chars),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TRUNCATION_NOTICE;

    fn budget(total: usize, min_ratio: f64) -> ContentBudget {
        ContentBudget::new(total, min_ratio).unwrap()
    }

    #[test]
    fn test_under_budget_returns_inputs_unchanged() {
        let (book, author) = balance_content("<p>short</p>", "<p>bio</p>", &budget(2000, 0.3));
        assert_eq!(book, "<p>short</p>");
        assert_eq!(author, "<p>bio</p>");
    }

    #[test]
    fn test_empty_book_gives_author_full_budget() {
        let long_bio = format!("<p>{}</p>", "b".repeat(3000));
        let (book, author) = balance_content("", &long_bio, &budget(2000, 0.3));
        assert!(book.is_empty());
        assert!(author.contains(TRUNCATION_NOTICE));
    }

    #[test]
    fn test_empty_author_gives_book_full_budget() {
        let long_book = format!("<p>{}</p>", "x".repeat(3000));
        let (book, author) = balance_content(&long_book, "", &budget(2000, 0.3));
        assert!(author.is_empty());
        assert!(book.contains(TRUNCATION_NOTICE));
    }

    #[test]
    fn test_long_book_short_author() {
        // Book ratio 2500/2600 clamps to 0.7: book gets 1400, author 600.
        // The 100-char author bio fits its share and comes back untouched.
        let book = "x".repeat(2500);
        let author = "y".repeat(100);
        let (book_out, author_out) = balance_content(&book, &author, &budget(2000, 0.3));

        assert_eq!(author_out, author);
        assert!(book_out.contains(TRUNCATION_NOTICE));
        let kept: usize = book_out.matches('x').count();
        assert_eq!(kept, 1400);
    }

    #[test]
    fn test_ratio_floor_protects_short_side() {
        // 10:1 length skew still leaves the short side 30% of the budget
        let book = "x".repeat(5000);
        let author = "y".repeat(500);
        let (book_out, author_out) = balance_content(&book, &author, &budget(1000, 0.3));

        assert_eq!(book_out.matches('x').count(), 700);
        assert_eq!(author_out.matches('y').count(), 300);
    }

    #[test]
    fn test_combined_output_within_budget() {
        let book = format!("<p>{}</p>", "x".repeat(1500));
        let author = format!("<p>{}</p>", "y".repeat(1500));
        let total = 2000;
        let (book_out, author_out) = balance_content(&book, &author, &budget(total, 0.3));

        let text_chars =
            book_out.matches('x').count() + author_out.matches('y').count();
        assert!(text_chars <= total);
    }
}
