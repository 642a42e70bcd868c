//! Stateless menu routing: a static table from normalized input to a tagged
//! action. Matching is exact-string, not pattern-based; every accepted
//! phrase is enumerated here.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceKind {
    SmartHome,
    Bau,
    Automation,
}

impl ServiceKind {
    pub fn id(self) -> &'static str {
        match self {
            Self::SmartHome => "smart_home",
            Self::Bau => "bau",
            Self::Automation => "automation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    MainMenu,
    ServiceDetails(ServiceKind),
    StartQuote,
    ContactCard,
    Website,
    ConsentPrompt,
    Consent { granted: bool },
    Fallback,
}

/// Trigger phrases and selection ids, exactly as the bot accepts them.
/// Inputs are lowercased and trimmed before lookup.
const TRIGGERS: &[(&str, MenuAction)] = &[
    // Greetings
    ("hi", MenuAction::MainMenu),
    ("hallo", MenuAction::MainMenu),
    ("hello", MenuAction::MainMenu),
    ("hey", MenuAction::MainMenu),
    ("moin", MenuAction::MainMenu),
    ("servus", MenuAction::MainMenu),
    ("guten tag", MenuAction::MainMenu),
    // Menu synonyms
    ("menu", MenuAction::MainMenu),
    ("menü", MenuAction::MainMenu),
    ("main_menu", MenuAction::MainMenu),
    ("start", MenuAction::MainMenu),
    // Services
    ("smart_home", MenuAction::ServiceDetails(ServiceKind::SmartHome)),
    ("smarthome", MenuAction::ServiceDetails(ServiceKind::SmartHome)),
    ("bau", MenuAction::ServiceDetails(ServiceKind::Bau)),
    ("bauservice", MenuAction::ServiceDetails(ServiceKind::Bau)),
    ("automation", MenuAction::ServiceDetails(ServiceKind::Automation)),
    ("z automation", MenuAction::ServiceDetails(ServiceKind::Automation)),
    // Quote flow entry, including the legacy quick-reply button label
    ("quote", MenuAction::StartQuote),
    ("angebot", MenuAction::StartQuote),
    ("📋 angebot", MenuAction::StartQuote),
    // Contact
    ("contact", MenuAction::ContactCard),
    ("kontakt", MenuAction::ContactCard),
    ("📞 anrufen", MenuAction::ContactCard),
    ("website", MenuAction::Website),
    // Consent
    ("dsgvo", MenuAction::ConsentPrompt),
    ("datenschutz", MenuAction::ConsentPrompt),
    ("consent_yes", MenuAction::Consent { granted: true }),
    ("consent_no", MenuAction::Consent { granted: false }),
];

pub fn route(normalized: &str) -> MenuAction {
    TRIGGERS
        .iter()
        .find(|(trigger, _)| *trigger == normalized)
        .map(|(_, action)| *action)
        .unwrap_or(MenuAction::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_greeting_routes_to_the_main_menu() {
        for greeting in ["hi", "hallo", "hello", "hey", "moin", "servus", "guten tag"] {
            assert_eq!(route(greeting), MenuAction::MainMenu, "greeting `{greeting}`");
        }
    }

    #[test]
    fn service_synonyms_route_to_their_service() {
        assert_eq!(route("smarthome"), MenuAction::ServiceDetails(ServiceKind::SmartHome));
        assert_eq!(route("bauservice"), MenuAction::ServiceDetails(ServiceKind::Bau));
        assert_eq!(route("z automation"), MenuAction::ServiceDetails(ServiceKind::Automation));
    }

    #[test]
    fn quote_triggers_cover_the_legacy_button_label() {
        assert_eq!(route("quote"), MenuAction::StartQuote);
        assert_eq!(route("angebot"), MenuAction::StartQuote);
        assert_eq!(route("📋 angebot"), MenuAction::StartQuote);
    }

    #[test]
    fn consent_selections_carry_the_grant_decision() {
        assert_eq!(route("consent_yes"), MenuAction::Consent { granted: true });
        assert_eq!(route("consent_no"), MenuAction::Consent { granted: false });
    }

    #[test]
    fn unknown_input_falls_back() {
        assert_eq!(route("wie spät ist es"), MenuAction::Fallback);
        assert_eq!(route(""), MenuAction::Fallback);
    }

    #[test]
    fn matching_is_exact_not_substring() {
        assert_eq!(route("hallo zusammen"), MenuAction::Fallback);
        assert_eq!(route("quotes"), MenuAction::Fallback);
    }
}
