//! LLM prompts for itinerary planning and chat.

use crate::itinerary::ItineraryRequest;
use crate::preferences::UserPreferences;

/// Collection of prompts used by the assistant.
pub struct Prompts;

impl Prompts {
    /// System prompt shared by one-shot planning and chat.
    pub fn system_message() -> &'static str {
        "You are Tour Assistant, a collaborative travel planner. \
         Lean on the available weather tool whenever the user shares a location, \
         and respond with concise, engaging guidance tailored to their plans."
    }

    /// Template for a full itinerary request.
    fn itinerary_template() -> &'static str {
        r#"Plan a {days}-day trip to {destination}.

Traveller interests: {interests}.
Budget: {budget}.

Write a day-by-day itinerary. For each day give a short theme, morning, afternoon and evening suggestions, and one practical tip. Favour activities that match the interests above and keep the plan realistic for the budget. Check the weather for {destination} before suggesting outdoor plans and mention it where it matters."#
    }

    /// Turn preferences into the prompt sent to the model.
    pub fn itinerary_request(prefs: &UserPreferences) -> ItineraryRequest {
        let days = prefs.duration_days().to_string();
        let interests = prefs.interests().collect::<Vec<_>>().join(", ");
        let budget = prefs
            .budget()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "flexible".to_string());

        let prompt = Self::itinerary_template()
            .replace("{days}", &days)
            .replace("{destination}", prefs.destination())
            .replace("{interests}", &interests)
            .replace("{budget}", &budget);

        ItineraryRequest::new(prompt)
    }

    /// Prompt used by the connectivity check.
    pub fn connection_check() -> &'static str {
        "Say 'hello' and nothing else."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::BudgetRange;

    #[test]
    fn test_prompts_are_not_empty() {
        assert!(!Prompts::system_message().is_empty());
        assert!(!Prompts::connection_check().is_empty());
    }

    #[test]
    fn test_itinerary_request_mentions_destination_and_interests() {
        let prefs = UserPreferences::new("Porto", 3, ["food", "history"], None).unwrap();
        let request = Prompts::itinerary_request(&prefs);

        assert!(!request.prompt().is_empty());
        assert!(request.prompt().contains("Porto"));
        assert!(request.prompt().contains("3-day"));
        assert!(request.prompt().contains("food, history"));
        assert!(request.prompt().contains("Budget: flexible"));
        assert!(!request.prompt().contains('{'));
    }

    #[test]
    fn test_itinerary_request_always_has_an_interest() {
        let prefs = UserPreferences::new("Reykjavik", 1, Vec::<String>::new(), None).unwrap();
        let request = Prompts::itinerary_request(&prefs);
        assert!(request.prompt().contains("sightseeing"));
    }

    #[test]
    fn test_itinerary_request_includes_budget() {
        let budget = BudgetRange::parse("800-1600", "EUR").unwrap();
        let prefs = UserPreferences::new("Vienna", 5, ["music"], Some(budget)).unwrap();
        let request = Prompts::itinerary_request(&prefs);
        assert!(request.prompt().contains("Budget: 800-1600 EUR"));
    }
}
