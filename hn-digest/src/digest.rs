use crate::types::{Candidate, RenderedBlock, StorySet};

/// Placeholder rendered for an empty story set.
pub const NO_STORIES_PLACEHOLDER: &str = "No stories available.";

/// Turns a ranked story set into the text block sent to the model.
pub struct PromptRenderer;

impl PromptRenderer {
    /// One paragraph per story, in set order. Pure and deterministic.
    pub fn render(stories: &StorySet) -> RenderedBlock {
        if stories.is_empty() {
            return RenderedBlock::new(NO_STORIES_PLACEHOLDER.to_string(), 0);
        }

        let paragraphs: Vec<String> = stories
            .iter()
            .enumerate()
            .map(|(i, story)| Self::render_story(i + 1, story))
            .collect();

        RenderedBlock::new(paragraphs.join("\n"), stories.len())
    }

    fn render_story(index: usize, story: &Candidate) -> String {
        let date = story
            .time
            .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let mut paragraph = String::new();
        paragraph.push_str(&format!("Article #{}:\n", index));
        paragraph.push_str(&format!(
            "Title: {}\n",
            story.title.as_deref().unwrap_or("No Title")
        ));
        paragraph.push_str(&format!("URL: {}\n", story.link()));
        paragraph.push_str(&format!("Score: {}\n", story.score));
        paragraph.push_str(&format!("Author: {}\n", story.author()));
        paragraph.push_str(&format!("Date: {}\n", date));
        paragraph.push_str(&format!(
            "Comments: {} ({})\n",
            story.comment_count,
            story.discussion_url()
        ));

        if let Some(text) = story.text.as_deref().filter(|t| !t.is_empty()) {
            paragraph.push_str(&format!("Text: {}\n", text));
        }

        paragraph
    }
}
