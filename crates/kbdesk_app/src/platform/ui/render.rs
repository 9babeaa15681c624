use kbdesk_core::{
    AppViewModel, BannerLevel, ChatView, DashboardView, PreviewPanel, Sender, Toast, ToastKind,
    ToastPhase, UploadView, PREVIEW_EMPTY_TEXT,
};
use kbdesk_engine::render_bot_terminal;

const PROGRESS_BAR_WIDTH: usize = 20;
const LOADING_ROW: &str = "Bot: ...";

/// Renders the whole view model as terminal lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    render_dashboard(&view.dashboard, &mut lines);
    render_upload(&view.dashboard.upload, &mut lines);
    render_chat(&view.chat, &mut lines);
    render_toasts(&view.toasts, &mut lines);
    if let Some(modal) = &view.dashboard.delete_modal {
        lines.push(String::new());
        lines.push(format!(
            "!! Delete \"{}\" (#{})? Type `confirm` or `cancel`.{}",
            modal.filename,
            modal.file_id,
            if modal.confirm_enabled { "" } else { " (deleting...)" }
        ));
    }
    lines
}

fn render_dashboard(view: &DashboardView, lines: &mut Vec<String>) {
    lines.push("== Knowledge base ==".to_string());
    match &view.kb_banner {
        Some(banner) => {
            let tag = match banner.level {
                BannerLevel::Info => "info",
                BannerLevel::Warning => "warning",
                BannerLevel::Success => "ok",
            };
            lines.push(format!("[{tag}] {}", banner.text));
        }
        None => lines.push("[..] Checking knowledge base status...".to_string()),
    }
    lines.push(format!(
        "Embed Data: {}",
        if view.embed_enabled { "available (`embed`)" } else { "disabled" }
    ));
    if view.embed_progress.visible {
        lines.push(format!(
            "{} {:>3}% {}",
            progress_bar(view.embed_progress.width),
            view.embed_progress.width,
            view.embed_progress.text
        ));
    }

    lines.push("Files:".to_string());
    if view.files.is_empty() {
        lines.push("  (none)".to_string());
    }
    for row in &view.files {
        lines.push(format!(
            "  #{:<4} {:<32} {:<6} {}{}",
            row.file_id,
            row.filename,
            row.filetype,
            row.uploaded_at,
            if row.changed { "  *changed" } else { "" }
        ));
    }
}

fn render_upload(view: &UploadView, lines: &mut Vec<String>) {
    lines.push("== Upload ==".to_string());
    let file = view
        .selected_file
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(no file selected)".to_string());
    lines.push(format!(
        "File: {file} | chunk size {} | overlap {}",
        view.params.chunk_size, view.params.chunk_overlap
    ));
    lines.push(format!(
        "Preview Chunking: {} | Process and Save: {}",
        affordance(view.preview_enabled, view.preview_busy),
        affordance(view.process_enabled, view.process_busy)
    ));

    match &view.panel {
        PreviewPanel::Hidden => {}
        PreviewPanel::Chunks(chunks) => {
            lines.push(format!("Preview ({} chunks):", chunks.len()));
            for chunk in chunks {
                lines.push(format!("  Chunk {}:", chunk.chunk_number));
                lines.extend(chunk.content.lines().map(|line| format!("    {line}")));
            }
        }
        PreviewPanel::Empty => lines.push(format!("Preview: {PREVIEW_EMPTY_TEXT}")),
        PreviewPanel::Failed(text) => lines.push(format!("Preview: {text}")),
    }
}

fn render_chat(view: &ChatView, lines: &mut Vec<String>) {
    lines.push(format!("== Chat ({}) ==", view.session_id));
    for turn in &view.turns {
        match turn.sender {
            Sender::User => lines.push(format!("You: {}", turn.text)),
            Sender::Bot => {
                let rendered = render_bot_terminal(&turn.text);
                match rendered.split_first() {
                    Some((first, rest)) => {
                        lines.push(format!("Bot: {first}"));
                        lines.extend(rest.iter().map(|line| format!("     {line}")));
                    }
                    None => lines.push("Bot:".to_string()),
                }
            }
        }
    }
    if view.loading {
        lines.push(LOADING_ROW.to_string());
    }
}

fn render_toasts(toasts: &[Toast], lines: &mut Vec<String>) {
    for toast in toasts
        .iter()
        .filter(|toast| toast.phase != ToastPhase::Leaving)
    {
        let tag = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
        };
        lines.push(format!("({tag} #{}) {}", toast.id, toast.message));
    }
}

fn affordance(enabled: bool, busy: bool) -> &'static str {
    match (enabled, busy) {
        (_, true) => "working...",
        (true, false) => "ready",
        (false, false) => "disabled",
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}
