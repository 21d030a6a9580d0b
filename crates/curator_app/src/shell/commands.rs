use curator_core::{
    Destination, EpisodeId, GuardChoice, Msg, Page, ScanKind, SettingsSection,
};

/// One parsed line of operator input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    Send(Msg),
    /// Change one field of a section's draft.
    Edit {
        section: SettingsSection,
        key: String,
        value: serde_json::Value,
    },
    /// Save or discard; `None` means the section on screen.
    Save(Option<SettingsSection>),
    Discard(Option<SettingsSection>),
    /// Start an import; missing parts come from preferences or config.
    Import {
        folder: Option<String>,
        limit: Option<u32>,
    },
    Show,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
commands:
  go <dashboard|shows|import|watcher|settings|logs>
  tab <general|formats|metadata|notifications|watcher>
  set <section> <key> <value>      edit a settings field
  save [section] | discard [section]
  choose <save|discard|cancel>     answer an unsaved-changes prompt
  scan <full|quick|ongoing>
  scan-selected <id> [id...]       inline scan of specific episodes
  dismiss                          close the scan result dialog
  refresh | refresh-dismiss
  import [folder] [limit]
  continue | finish | minimize | restore | import-dismiss
  watcher <start|stop>
  hide | show                      simulate window visibility
  status | help | quit";

pub(crate) fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Show);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (verb, rest.as_slice()) {
        ("go", [page]) => send(Msg::NavigateRequested(Destination::Page(parse_page(page)?))),
        ("tab", [section]) => send(Msg::NavigateRequested(Destination::Tab(parse_section(
            section,
        )?))),
        ("set", [section, key, value @ ..]) if !value.is_empty() => Command::Edit {
            section: parse_section(section)?,
            key: (*key).to_string(),
            value: parse_value(&value.join(" ")),
        },
        ("save", []) => Command::Save(None),
        ("save", [section]) => Command::Save(Some(parse_section(section)?)),
        ("discard", []) => Command::Discard(None),
        ("discard", [section]) => Command::Discard(Some(parse_section(section)?)),
        ("choose", [choice]) => send(Msg::GuardChoice(parse_choice(choice)?)),
        ("scan", [kind]) => send(Msg::ScanClicked(parse_scan_kind(kind)?)),
        ("scan-selected", ids) => send(Msg::ScanSelectedClicked(parse_ids(ids)?)),
        ("dismiss", []) => send(Msg::ModalDismissed),
        ("refresh", []) => send(Msg::RefreshAllClicked),
        ("refresh-dismiss", []) => send(Msg::RefreshReportDismissed),
        ("import", []) => Command::Import {
            folder: None,
            limit: None,
        },
        ("import", [folder]) => Command::Import {
            folder: Some((*folder).to_string()),
            limit: None,
        },
        ("import", [folder, limit]) => Command::Import {
            folder: Some((*folder).to_string()),
            limit: Some(
                limit
                    .parse()
                    .map_err(|_| format!("limit must be a number, got {limit:?}"))?,
            ),
        },
        ("continue", []) => send(Msg::ImportContinueClicked),
        ("finish", []) => send(Msg::ImportFinishClicked),
        ("minimize", []) => send(Msg::ImportMinimizeClicked),
        ("restore", []) => send(Msg::ImportRestoreClicked),
        ("import-dismiss", []) => send(Msg::ImportDismissClicked),
        ("watcher", ["start"]) => send(Msg::WatcherStartClicked),
        ("watcher", ["stop"]) => send(Msg::WatcherStopClicked),
        ("hide", []) => send(Msg::VisibilityChanged { visible: false }),
        ("show", []) => send(Msg::VisibilityChanged { visible: true }),
        ("status", []) => Command::Show,
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(format!("unrecognised command {line:?}; try help")),
    };
    Ok(command)
}

fn send(msg: Msg) -> Command {
    Command::Send(msg)
}

fn parse_page(word: &str) -> Result<Page, String> {
    match word {
        "dashboard" => Ok(Page::Dashboard),
        "shows" => Ok(Page::Shows),
        "import" => Ok(Page::Import),
        "watcher" => Ok(Page::Watcher),
        "settings" => Ok(Page::Settings),
        "logs" => Ok(Page::Logs),
        other => Err(format!("unknown page {other:?}")),
    }
}

fn parse_section(word: &str) -> Result<SettingsSection, String> {
    match word {
        "general" => Ok(SettingsSection::General),
        "formats" => Ok(SettingsSection::Formats),
        "metadata" => Ok(SettingsSection::Metadata),
        "notifications" => Ok(SettingsSection::Notifications),
        "watcher" => Ok(SettingsSection::Watcher),
        other => Err(format!("unknown settings section {other:?}")),
    }
}

fn parse_choice(word: &str) -> Result<GuardChoice, String> {
    match word {
        "save" => Ok(GuardChoice::Save),
        "discard" => Ok(GuardChoice::Discard),
        "cancel" => Ok(GuardChoice::Cancel),
        other => Err(format!("choose save, discard or cancel, not {other:?}")),
    }
}

fn parse_scan_kind(word: &str) -> Result<ScanKind, String> {
    match word {
        "full" => Ok(ScanKind::Full),
        "quick" => Ok(ScanKind::Quick),
        "ongoing" => Ok(ScanKind::Ongoing),
        other => Err(format!("unknown scan type {other:?}")),
    }
}

fn parse_ids(words: &[&str]) -> Result<Vec<EpisodeId>, String> {
    words
        .iter()
        .map(|word| {
            word.parse()
                .map_err(|_| format!("episode ids are numbers, got {word:?}"))
        })
        .collect()
}

/// JSON when it parses, otherwise the raw text as a string.
fn parse_value(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_navigation() {
        assert_eq!(
            parse("go shows").unwrap(),
            Command::Send(Msg::NavigateRequested(Destination::Page(Page::Shows)))
        );
        assert_eq!(
            parse("tab formats").unwrap(),
            Command::Send(Msg::NavigateRequested(Destination::Tab(
                SettingsSection::Formats
            )))
        );
        assert!(parse("go nowhere").is_err());
    }

    #[test]
    fn edit_values_are_json_when_possible() {
        assert_eq!(
            parse("set metadata fetchArtwork true").unwrap(),
            Command::Edit {
                section: SettingsSection::Metadata,
                key: "fetchArtwork".to_string(),
                value: json!(true),
            }
        );
        assert_eq!(
            parse("set formats episodePattern S{season} E{episode}").unwrap(),
            Command::Edit {
                section: SettingsSection::Formats,
                key: "episodePattern".to_string(),
                value: json!("S{season} E{episode}"),
            }
        );
        assert!(parse("set formats episodePattern").is_err());
    }

    #[test]
    fn selected_scan_accepts_empty_selection() {
        assert_eq!(
            parse("scan-selected").unwrap(),
            Command::Send(Msg::ScanSelectedClicked(Vec::new()))
        );
        assert_eq!(
            parse("scan-selected 3 9").unwrap(),
            Command::Send(Msg::ScanSelectedClicked(vec![3, 9]))
        );
        assert!(parse("scan-selected three").is_err());
    }

    #[test]
    fn import_parts_are_optional() {
        assert_eq!(
            parse("import").unwrap(),
            Command::Import {
                folder: None,
                limit: None
            }
        );
        assert_eq!(
            parse("import /media/incoming 5").unwrap(),
            Command::Import {
                folder: Some("/media/incoming".to_string()),
                limit: Some(5),
            }
        );
        assert!(parse("import /media/incoming many").is_err());
    }

    #[test]
    fn blank_line_shows_status() {
        assert_eq!(parse("   ").unwrap(), Command::Show);
        assert_eq!(
            parse("choose cancel").unwrap(),
            Command::Send(Msg::GuardChoice(GuardChoice::Cancel))
        );
    }
}
