//! Static menu and prompt content. Everything user-visible lives here as
//! data so the engine stays free of copy and the texts stay testable.

use crate::intents::{Choice, ListRow, ListSection, ReplyIntent};
use crate::menu::ServiceKind;

pub const PHONE: &str = "+49 177 454 7727";
pub const EMAIL: &str = "info@west-money.com";
pub const WEBSITE_URL: &str = "https://west-money.com";

pub const CONSENT_OPT_IN_BASIS: &str = "Consent - WhatsApp opt-in";
pub const CONSENT_OPT_OUT_BASIS: &str = "Consent - WhatsApp opt-out";

pub fn main_menu() -> ReplyIntent {
    ReplyIntent::list(
        "🏠 *Willkommen bei West Money!*\n\nWie können wir Ihnen helfen? Wählen Sie eine Option:",
        "Menü öffnen",
        vec![
            ListSection::new(
                "Unsere Services",
                vec![
                    ListRow::new("smart_home", "🏡 Smart Home", "LOXONE Integration & Automation"),
                    ListRow::new("bau", "🏗️ Bauservice", "Barrierefrei & Energieeffizient"),
                    ListRow::new("automation", "⚡ Z Automation", "Gebäudeautomation"),
                ],
            ),
            ListSection::new(
                "Kontakt",
                vec![
                    ListRow::new("quote", "📋 Angebot anfordern", "Kostenloses Angebot"),
                    ListRow::new("contact", "📞 Kontakt", "Sprechen Sie mit uns"),
                    ListRow::new("website", "🌐 Website", "west-money.com"),
                ],
            ),
        ],
    )
}

pub fn service_details(service: ServiceKind) -> ReplyIntent {
    let body = match service {
        ServiceKind::SmartHome => {
            "*LOXONE Smart Home Partner*\n\n\
             ✅ Intelligente Lichtsteuerung\n\
             ✅ Heizung & Klima Automation\n\
             ✅ Sicherheit & Überwachung\n\
             ✅ Multiroom Audio\n\
             ✅ Jalousien & Beschattung\n\n\
             *Vorteile:*\n\
             • Bis zu 50% Energieersparnis\n\
             • Komfort auf Knopfdruck\n\
             • Wertsteigerung Ihrer Immobilie\n\n\
             Möchten Sie ein kostenloses Angebot?"
        }
        ServiceKind::Bau => {
            "*Barrierefrei & Energieeffizient*\n\n\
             ✅ Barrierefreies Bauen\n\
             ✅ Energetische Sanierung\n\
             ✅ Umbau & Renovierung\n\
             ✅ Neubau-Projekte\n\n\
             *Spezialisierungen:*\n\
             • KfW-förderfähige Maßnahmen\n\
             • Altersgerechte Umbauten\n\
             • Smart Home Integration\n\n\
             Interesse an einer Beratung?"
        }
        ServiceKind::Automation => {
            "*Gebäudeautomation Experten*\n\n\
             ✅ ComfortClick Integration\n\
             ✅ KNX Systeme\n\
             ✅ BACnet & Modbus\n\
             ✅ Industrieautomation\n\n\
             *Für:*\n\
             • Bürogebäude\n\
             • Hotels\n\
             • Industrieanlagen\n\
             • Wohnkomplexe\n\n\
             Sollen wir Sie beraten?"
        }
    };

    ReplyIntent::buttons(
        body,
        vec![
            Choice::new("quote", "📋 Angebot"),
            Choice::new("contact", "📞 Anrufen"),
            Choice::new("main_menu", "↩️ Zurück"),
        ],
    )
}

pub fn quote_name_prompt() -> ReplyIntent {
    ReplyIntent::text(
        "📋 *Angebot anfordern*\n\nGerne erstellen wir Ihnen ein kostenloses Angebot.\n\nWie ist Ihr Name?",
    )
}

pub fn quote_service_prompt(name: &str) -> ReplyIntent {
    ReplyIntent::buttons(
        format!("Danke, {name}! Für welchen Service möchten Sie ein Angebot?"),
        vec![
            Choice::new("quote_smart_home", "🏡 Smart Home"),
            Choice::new("quote_bau", "🏗️ Bauservice"),
            Choice::new("quote_automation", "⚡ Automation"),
        ],
    )
}

pub fn quote_email_prompt() -> ReplyIntent {
    ReplyIntent::text("Perfekt! Bitte geben Sie Ihre E-Mail-Adresse an:")
}

pub fn quote_details_prompt() -> ReplyIntent {
    ReplyIntent::text("Fast fertig! Beschreiben Sie kurz Ihr Projekt:")
}

pub fn quote_confirmation(name: &str, email: &str) -> ReplyIntent {
    ReplyIntent::text(format!(
        "✅ *Vielen Dank, {name}!*\n\n\
         Ihre Anfrage wurde erfolgreich übermittelt.\n\n\
         📧 Wir senden Ihnen das Angebot an: {email}\n\n\
         ⏰ Sie erhalten innerhalb von 24 Stunden eine Rückmeldung.\n\n\
         Bei Fragen erreichen Sie uns unter:\n📞 {PHONE}"
    ))
}

pub fn contact_card() -> ReplyIntent {
    ReplyIntent::text(format!(
        "📞 *Kontakt*\n\n\
         *West Money Bau*\nEnterprise Universe GmbH\n\n\
         📱 {PHONE}\n📧 {EMAIL}\n🌐 west-money.com\n\n\
         📍 Deutschland\n\n\
         ⏰ Mo-Fr: 8:00 - 18:00 Uhr"
    ))
}

pub fn website() -> ReplyIntent {
    ReplyIntent::text(format!("🌐 Besuchen Sie unsere Website:\n\n{WEBSITE_URL}"))
}

pub fn consent_prompt() -> ReplyIntent {
    ReplyIntent::buttons(
        "🔐 *Datenschutz*\n\nMöchten Sie Ihre Einwilligung zum Erhalt von WhatsApp-Nachrichten aktualisieren?",
        vec![Choice::new("consent_yes", "✅ Zustimmen"), Choice::new("consent_no", "❌ Ablehnen")],
    )
}

pub fn consent_ack(granted: bool) -> ReplyIntent {
    if granted {
        ReplyIntent::text("✅ Vielen Dank! Sie haben der WhatsApp-Kommunikation zugestimmt.")
    } else {
        ReplyIntent::text(
            "✅ Verstanden. Sie erhalten keine weiteren Marketing-Nachrichten von uns.",
        )
    }
}

pub fn fallback() -> ReplyIntent {
    ReplyIntent::text(
        "👋 Hallo! Ich bin der West Money Bot.\n\nTippen Sie *\"Menü\"* um unsere Services zu sehen oder stellen Sie mir eine Frage.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intents::ReplyIntent;

    #[test]
    fn main_menu_lists_all_six_options_in_two_sections() {
        let ReplyIntent::List { sections, button_label, .. } = main_menu() else {
            panic!("main menu must be a list prompt");
        };
        assert_eq!(button_label, "Menü öffnen");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].rows.len(), 3);
        assert_eq!(sections[1].rows.len(), 3);

        let ids: Vec<&str> =
            sections.iter().flat_map(|s| &s.rows).map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["smart_home", "bau", "automation", "quote", "contact", "website"]);
    }

    #[test]
    fn service_details_always_offer_quote_contact_and_back() {
        for kind in [ServiceKind::SmartHome, ServiceKind::Bau, ServiceKind::Automation] {
            let ReplyIntent::Buttons { choices, .. } = service_details(kind) else {
                panic!("service details must be a button prompt");
            };
            let ids: Vec<&str> = choices.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, ["quote", "contact", "main_menu"], "service {kind:?}");
        }
    }

    #[test]
    fn quote_prompts_echo_collected_answers() {
        let ReplyIntent::Buttons { body, .. } = quote_service_prompt("Jane") else {
            panic!("service prompt must be a button prompt");
        };
        assert!(body.starts_with("Danke, Jane!"));

        let ReplyIntent::Text { body } = quote_confirmation("Jane", "jane@x.com") else {
            panic!("confirmation must be plain text");
        };
        assert!(body.contains("Vielen Dank, Jane!"));
        assert!(body.contains("jane@x.com"));
    }
}
