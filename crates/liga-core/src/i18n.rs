// User-facing strings: one fixed German table with `{{param}}` templates.

/// Key → template table. Templates may reference parameters as `{{name}}`.
const DE: &[(&str, &str)] = &[
    // Common
    ("app.title", "Liga Ranking"),
    ("common.loading", "Laden..."),
    ("common.cancel", "Abbrechen"),
    ("common.add", "Hinzufügen"),
    ("common.remove", "Entfernen"),
    ("common.quit", "Beenden"),
    ("common.quitConfirm", "Wirklich beenden? (j/n)"),
    // Auth
    ("auth.login", "Anmelden"),
    ("auth.logout", "Abmelden"),
    ("auth.signup", "Registrieren"),
    ("auth.email", "E-Mail"),
    ("auth.password", "Passwort"),
    ("auth.signupSuccess", "Bitte bestätige dein Konto per E-Mail."),
    // Home
    ("home.greeting", "Hallo du"),
    ("home.greetingUser", "Hallo, {{email}}"),
    ("home.admin", "Admin"),
    ("home.noLeagues", "Noch keine Ligen in diesem Land."),
    // Countries
    ("country.de", "Deutschland"),
    ("country.at", "Österreich"),
    ("country.ch", "Schweiz"),
    // League
    ("league.addNew", "+ Neue Liga hinzufügen"),
    ("league.dialogTitle", "Neue Liga — {{country}}"),
    ("league.name", "Liga-Name"),
    ("league.namePlaceholder", "z.B. Bundesliga"),
    ("league.teams", "Mannschaften"),
    ("league.teamPlaceholder", "Mannschaftsname"),
    ("league.noTeams", "Noch keine Mannschaften hinzugefügt."),
    ("league.create", "Liga erstellen"),
    ("league.back", "Zurück"),
    ("league.ranking", "Tabelle"),
    ("league.edit", "Bearbeiten"),
    ("league.editTitle", "Liga bearbeiten"),
    ("league.save", "Speichern"),
    ("league.notFound", "Liga nicht gefunden"),
    // Key hints
    ("help.home", "←/→ Land · ↑/↓ Auswahl · Enter Öffnen"),
    ("help.newLeague", "n Neue Liga"),
    ("help.signIn", "l Anmelden"),
    ("help.signOut", "o Abmelden"),
    ("help.quit", "q Beenden"),
    ("help.login", "Tab Feld · Enter Anmelden · Strg+R Registrieren · Esc Zurück"),
    ("help.league", "↑/↓ Auswahl · Leertaste Aufnehmen/Ablegen · Maus ziehen · r Neu laden · Esc Zurück"),
    ("help.dragging", "↑/↓ Ziel wählen · Leertaste Ablegen · Esc Abbrechen"),
    ("help.edit", "e Bearbeiten"),
    ("help.dialog", "Tab Feld · Enter Hinzufügen · Entf Entfernen · Strg+S Speichern · Esc Abbrechen"),
];

/// Look up `key` and substitute `params`.
///
/// Each parameter replaces the first `{{name}}` occurrence in the template.
/// Unknown keys are returned verbatim so a missing entry is visible on screen.
pub fn t(key: &str, params: &[(&str, &str)]) -> String {
    let Some(template) = lookup(key) else {
        return key.to_string();
    };
    let mut value = template.to_string();
    for (name, replacement) in params {
        let placeholder = format!("{{{{{name}}}}}");
        value = value.replacen(&placeholder, replacement, 1);
    }
    value
}

/// The raw template for `key`, if the table has one.
pub fn lookup(key: &str) -> Option<&'static str> {
    DE.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}
