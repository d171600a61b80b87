//! End-to-end scenarios: a debugger transcript through the session
//! layer, key input through the keymap, and source through the
//! tokenizer.

use gdb_frontend_core::mi::records::StopReason;
use gdb_frontend_core::mi::ResultClass;
use gdb_frontend_core::session::OutputChannel;
use gdb_frontend_core::{
    DebugSession, GdbEvent, KeyMap, Language, LogicalKey, ScanState, TokenKind, Tokenizer,
};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();
}

/// A session digests a real startup-and-break transcript fed in
/// pipe-sized fragments.
#[test]
fn session_digests_a_debug_transcript() {
    init_logging();
    let mut session = DebugSession::new();

    let transcript = concat!(
        "~\"Reading symbols from ./demo...\\n\"\n",
        "=thread-group-added,id=\"i1\"\n",
        "(gdb) \n",
        "1^done,bkpt={number=\"1\",type=\"breakpoint\",disp=\"keep\",enabled=\"y\",",
        "addr=\"0x0000000000401136\",func=\"main\",file=\"demo.c\",line=\"5\",",
        "thread-groups=[\"i1\"],times=\"0\"}\n",
        "(gdb) \n",
        "*running,thread-id=\"all\"\n",
        "*stopped,reason=\"breakpoint-hit\",disp=\"keep\",bkptno=\"1\",thread-id=\"1\",",
        "frame={addr=\"0x0000000000401136\",func=\"main\",args=[],file=\"demo.c\",line=\"5\"}\n",
    );

    // Register the command the transcript answers.
    let wire = session.format_command("break-insert main");
    assert_eq!(wire, "1-break-insert main\n");

    // Feed in small fragments, the way a pipe delivers them.
    for chunk in transcript.as_bytes().chunks(17) {
        session.feed(chunk).unwrap();
    }

    let mut events = Vec::new();
    while let Some(event) = session.poll_event() {
        events.push(event);
    }

    match &events[0] {
        GdbEvent::Output { channel, content } => {
            assert_eq!(*channel, OutputChannel::Console);
            assert!(content.starts_with("Reading symbols"));
        }
        other => panic!("expected console output first, got {other:?}"),
    }
    assert!(events.iter().any(|event| matches!(
        event,
        GdbEvent::CommandResult { token: Some(1), class: ResultClass::Done, .. }
    )));
    assert!(events
        .iter()
        .any(|event| matches!(event, GdbEvent::Running { .. })));
    match events.last().unwrap() {
        GdbEvent::Stopped {
            reason,
            frame,
            thread_id,
        } => {
            assert_eq!(*reason, StopReason::BreakpointHit);
            assert_eq!(frame.as_ref().unwrap().line, Some(5));
            assert_eq!(thread_id.as_deref(), Some("1"));
        }
        other => panic!("expected stopped event last, got {other:?}"),
    }

    assert!(!session.command_in_flight());
    assert!(!session.state().running);
    assert_eq!(session.state().current_thread.as_deref(), Some("1"));
}

/// Arrow keys resolve immediately; a lone Escape resolves on the
/// timeout-driven finalize.
#[test]
fn keymap_resolves_terminal_input() {
    init_logging();
    let mut keymap = KeyMap::new();

    keymap.reset();
    for byte in [0x1b, b'[', b'A'] {
        keymap.push_byte(byte);
    }
    assert_eq!(keymap.state(), ScanState::Found);
    assert_eq!(keymap.resolved(), Some(LogicalKey::Up));

    keymap.reset();
    keymap.push_byte(0x1b);
    assert_eq!(keymap.state(), ScanState::Matching);
    // The dispatch layer's inter-key timer fires here.
    keymap.finalize();
    assert_eq!(keymap.resolved(), Some(LogicalKey::Escape));

    keymap.reset();
    keymap.push_byte(b'j');
    assert_eq!(keymap.state(), ScanState::NotFound);
}

/// The display layer picks a lexer by extension and walks tokens.
#[test]
fn tokenizer_highlights_a_source_file() {
    init_logging();
    let language = Language::from_extension(".c");
    assert_eq!(language, Language::C);

    let mut tokenizer = Tokenizer::new();
    assert!(tokenizer.set_buffer(
        "#include <stdio.h>\n\nint main(void) {\n    return 0; /* ok */\n}\n",
        language,
    ));

    let mut kinds = Vec::new();
    while let Some(token) = tokenizer.next_token() {
        kinds.push((token.kind, token.text));
    }

    assert!(kinds.contains(&(TokenKind::Directive, "#include".to_string())));
    assert!(kinds.contains(&(TokenKind::Type, "int".to_string())));
    assert!(kinds.contains(&(TokenKind::Keyword, "return".to_string())));
    assert!(kinds.contains(&(TokenKind::Number, "0".to_string())));
    assert!(kinds.contains(&(TokenKind::Comment, "/* ok */".to_string())));
}
