use std::path::PathBuf;

use kbdesk_core::{ChunkParams, CloseTrigger, EmbedScope, ModalId, Msg};
use thiserror::Error;

pub const HELP_TEXT: &str = "\
Commands:
  delete <id>            ask to delete a file
  confirm | cancel       answer the delete dialog (`dismiss` closes it like a backdrop click)
  embed [all]            embed changed files, or every file
  select [path]          pick the file to upload (no path clears it)
  params <size> <overlap> set chunk size and overlap
  preview | process      preview chunking, then upload
  chat                   open the chat widget
  say <text>             send a chat message
  close <toast id>       dismiss a notification
  transcript             export the chat as HTML into the state directory
  show | help | quit";

/// What a typed line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Core(Msg),
    Show,
    Help,
    Transcript,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "delete" | "rm" => Command::Core(Msg::DeleteRequested {
            file_id: rest.parse().map_err(|_| InputError::Usage("delete <id>"))?,
        }),
        "confirm" | "yes" => Command::Core(Msg::DeleteConfirmed),
        "cancel" | "no" => Command::Core(Msg::ModalCloseRequested {
            modal: ModalId::DeleteConfirm,
            trigger: CloseTrigger::Button,
        }),
        "dismiss" => Command::Core(Msg::ModalCloseRequested {
            modal: ModalId::DeleteConfirm,
            trigger: CloseTrigger::Backdrop,
        }),
        "embed" => {
            let scope = match rest {
                "" => EmbedScope::Changed,
                "all" => EmbedScope::All,
                _ => return Err(InputError::Usage("embed [all]")),
            };
            Command::Core(Msg::EmbedClicked { scope })
        }
        "select" => Command::Core(Msg::FileSelected(
            (!rest.is_empty()).then(|| PathBuf::from(rest)),
        )),
        "params" => Command::Core(Msg::ChunkParamsChanged(parse_params(rest)?)),
        "preview" => Command::Core(Msg::PreviewClicked),
        "process" => Command::Core(Msg::ProcessClicked),
        "chat" => Command::Core(Msg::ChatOpened),
        "say" => Command::Core(Msg::ChatSubmitted(rest.to_string())),
        "close" => Command::Core(Msg::ToastClosed(
            rest.parse().map_err(|_| InputError::Usage("close <toast id>"))?,
        )),
        "transcript" => Command::Transcript,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_params(rest: &str) -> Result<ChunkParams, InputError> {
    const USAGE: &str = "params <size> <overlap>";
    let mut parts = rest.split_whitespace();
    let mut next = || -> Result<u32, InputError> {
        parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or(InputError::Usage(USAGE))
    };
    let chunk_size = next()?;
    let chunk_overlap = next()?;
    if parts.next().is_some() {
        return Err(InputError::Usage(USAGE));
    }
    Ok(ChunkParams {
        chunk_size,
        chunk_overlap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn core(line: &str) -> Msg {
        match parse_command(line) {
            Ok(Some(Command::Core(msg))) => msg,
            other => panic!("{line:?} parsed as {other:?}"),
        }
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn delete_dispatches_by_id() {
        assert_eq!(core("delete 12"), Msg::DeleteRequested { file_id: 12 });
        assert_eq!(
            parse_command("delete twelve"),
            Err(InputError::Usage("delete <id>"))
        );
    }

    #[test]
    fn modal_close_paths() {
        assert_eq!(
            core("cancel"),
            Msg::ModalCloseRequested {
                modal: ModalId::DeleteConfirm,
                trigger: CloseTrigger::Button,
            }
        );
        assert_eq!(
            core("dismiss"),
            Msg::ModalCloseRequested {
                modal: ModalId::DeleteConfirm,
                trigger: CloseTrigger::Backdrop,
            }
        );
    }

    #[test]
    fn embed_scopes() {
        assert_eq!(
            core("embed"),
            Msg::EmbedClicked {
                scope: EmbedScope::Changed
            }
        );
        assert_eq!(core("EMBED all"), Msg::EmbedClicked { scope: EmbedScope::All });
        assert!(parse_command("embed some").is_err());
    }

    #[test]
    fn select_keeps_spaces_in_paths() {
        assert_eq!(
            core("select /data/Panduan Layanan.pdf"),
            Msg::FileSelected(Some(PathBuf::from("/data/Panduan Layanan.pdf")))
        );
        assert_eq!(core("select"), Msg::FileSelected(None));
    }

    #[test]
    fn params_need_two_numbers() {
        assert_eq!(
            core("params 1500 300"),
            Msg::ChunkParamsChanged(ChunkParams {
                chunk_size: 1500,
                chunk_overlap: 300,
            })
        );
        assert!(parse_command("params 1500").is_err());
        assert!(parse_command("params 1500 300 7").is_err());
    }

    #[test]
    fn say_passes_text_untrimmed_inside() {
        assert_eq!(
            core("say  apa  syarat KTP?"),
            Msg::ChatSubmitted("apa  syarat KTP?".into())
        );
    }

    #[test]
    fn local_commands_and_unknown_words() {
        assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("transcript"), Ok(Some(Command::Transcript)));
        assert_eq!(
            parse_command("frobnicate"),
            Err(InputError::Unknown("frobnicate".into()))
        );
    }
}
