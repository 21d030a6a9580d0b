use std::fmt::Write;

use curator_core::{
    AppViewModel, ImportStage, ImportSummary, ImportView, LogLevel, Page, RefreshView, ScanView,
    WatcherIndicator, WatcherView,
};

/// Console lines kept visible under the import panel.
const CONSOLE_LINES: usize = 8;

/// Renders the view model as a plain-text status block.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let page = format!("{:?}", view.location.page).to_lowercase();
    if view.location.page == Page::Settings {
        let _ = writeln!(out, "== {page} / {} ==", view.location.tab.as_str());
    } else {
        let _ = writeln!(out, "== {page} ==");
    }
    let _ = writeln!(out, "watcher: {}", indicator(view.watcher.indicator));

    if !view.dirty_sections.is_empty() {
        let names: Vec<&str> = view.dirty_sections.iter().map(|s| s.as_str()).collect();
        let _ = writeln!(out, "unsaved: {}", names.join(", "));
    }
    if let Some(prompt) = &view.prompt {
        let state = if prompt.saving { "saving..." } else { "waiting for choice" };
        let _ = writeln!(
            out,
            "prompt: unsaved {} settings ({state})",
            prompt.section.as_str()
        );
    }
    if let Some(modal) = &view.modal {
        let close = if modal.dismissible { " [dismiss]" } else { "" };
        let _ = writeln!(out, "dialog: {}: {}{close}", modal.title, modal.body);
    }

    render_scan(&mut out, &view.scan);
    render_refresh(&mut out, &view.refresh);
    render_import(&mut out, &view.import);
    if view.location.page == Page::Watcher {
        render_watcher(&mut out, &view.watcher);
    }
    out
}

fn indicator(indicator: WatcherIndicator) -> &'static str {
    match indicator {
        WatcherIndicator::Unknown => "unknown",
        WatcherIndicator::Stopped => "stopped",
        WatcherIndicator::Running => "running",
        WatcherIndicator::Paused => "paused",
    }
}

fn degraded(flag: bool) -> &'static str {
    if flag {
        " (reconnecting)"
    } else {
        ""
    }
}

fn render_scan(out: &mut String, scan: &ScanView) {
    if !scan.busy {
        return;
    }
    let percent = scan.percent.map(|p| format!("{p}% ")).unwrap_or_default();
    let _ = writeln!(
        out,
        "scan: {percent}{}{}",
        scan.status_line.as_deref().unwrap_or("working"),
        degraded(scan.degraded)
    );
}

fn render_refresh(out: &mut String, refresh: &RefreshView) {
    if refresh.running {
        let _ = writeln!(
            out,
            "refresh: {}/{} {}{}",
            refresh.current,
            refresh.total,
            refresh.current_show.as_deref().unwrap_or(""),
            degraded(refresh.degraded)
        );
    }
    if let Some(report) = &refresh.report {
        let _ = writeln!(
            out,
            "refresh report: {} refreshed, {} failed [refresh-dismiss]",
            report.completed.len(),
            report.errors.len()
        );
        for error in &report.errors {
            let _ = writeln!(out, "  ! {error}");
        }
    }
}

fn summary_line(summary: &ImportSummary) -> String {
    format!(
        "{} added, {} partial, {} existing, {} not found, {} errors",
        summary.added, summary.partial, summary.existing, summary.not_found, summary.errors
    )
}

fn render_import(out: &mut String, import: &ImportView) {
    match import.stage {
        ImportStage::Idle => return,
        ImportStage::Starting => {
            let _ = writeln!(out, "import: starting batch {}", import.batch);
        }
        ImportStage::Scanning => {
            let _ = writeln!(
                out,
                "import: batch {} {}% found {} added {} skipped {} {}{}",
                import.batch,
                import.progress.percent,
                import.progress.shows_found,
                import.progress.shows_added,
                import.progress.shows_skipped,
                import.progress.current_show.as_deref().unwrap_or(""),
                degraded(import.degraded)
            );
        }
        ImportStage::Review => {
            if let Some(review) = &import.review {
                let _ = writeln!(
                    out,
                    "import review (batch {}): {}",
                    import.batch,
                    summary_line(&review.summary)
                );
                for show in &review.result.shows_processed {
                    let _ = writeln!(
                        out,
                        "  {:<10} {} ({}/{})",
                        format!("{:?}", show.status).to_lowercase(),
                        show.name,
                        show.episodes_matched,
                        show.total_episodes
                    );
                }
                let actions = if review.can_continue {
                    "[continue] [finish] [minimize]"
                } else {
                    "[finish] [minimize]"
                };
                let _ = writeln!(out, "  {actions}");
            }
        }
        ImportStage::Minimized => {
            if let Some(summary) = &import.minimized {
                let _ = writeln!(out, "import result: {} [restore]", summary_line(summary));
            }
        }
    }

    let start = import.console.len().saturating_sub(CONSOLE_LINES);
    for entry in &import.console[start..] {
        let level = match entry.level {
            LogLevel::Info => "info",
            LogLevel::Success => "ok",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
            LogLevel::Skip => "skip",
        };
        let _ = writeln!(out, "  {} {level:<5} {}", entry.time, entry.message);
    }
}

fn render_watcher(out: &mut String, watcher: &WatcherView) {
    if let Some(status) = &watcher.status {
        let _ = writeln!(
            out,
            "watcher detail: {} pending, {} queued{}",
            status.pending_files,
            status.queued_files,
            status
                .pause_reason
                .as_deref()
                .map(|reason| format!(", paused: {reason}"))
                .unwrap_or_default()
        );
    }
    for prerequisite in &watcher.prerequisites {
        let mark = if prerequisite.met { "ok" } else { "missing" };
        let _ = writeln!(
            out,
            "  [{mark}] {}: {}",
            prerequisite.name, prerequisite.detail
        );
    }
    let mut actions = Vec::new();
    if watcher.can_start {
        actions.push("[watcher start]");
    }
    if watcher.can_stop {
        actions.push("[watcher stop]");
    }
    if watcher.command_pending {
        actions.push("(command pending)");
    }
    if !actions.is_empty() {
        let _ = writeln!(out, "  {}", actions.join(" "));
    }
}
