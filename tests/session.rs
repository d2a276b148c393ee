//! Session turn-loop tests
//!
//! Every adapter is a fake, so no audio, camera or network is needed

mod common;

use common::{Event, FakeChat, Log, ScriptedInput, VisionScript, fake_session};
use magic_mirror::{
    ChatOutcome, Error, Heard, Persona, Role, TurnOutcome, Utterance, VisionOutcome,
};

fn persona() -> Persona {
    Persona::default()
}

#[tokio::test]
async fn test_greeting_then_farewell_on_exit() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["exit", "tell me a joke"]),
        VisionScript::Describe("lovely".to_string()),
        FakeChat::numbered(log.clone(), 5),
    );

    let turns = session.run().await;

    assert_eq!(turns, 1);
    assert_eq!(log.spoken(), vec![persona().greeting, persona().farewell]);
    // Nothing after the farewell: no chat, no camera
    assert_eq!(log.events().len(), 2);
}

#[tokio::test]
async fn test_exit_wins_over_other_keywords() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["Look at me and then QUIT"]),
        VisionScript::Describe("lovely".to_string()),
        FakeChat::numbered(log.clone(), 5),
    );

    assert_eq!(session.run_turn().await, TurnOutcome::Exit);
    assert_eq!(log.spoken(), vec![persona().farewell]);
    assert_eq!(log.count(|e| matches!(e, Event::Captured)), 0);
    assert!(log.chat_requests().is_empty());
}

#[tokio::test]
async fn test_silence_skips_turn() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::new(vec![
            Heard::Nothing,
            Heard::Utterance(Utterance::now("   ")),
        ]),
        VisionScript::NoCamera,
        FakeChat::numbered(log.clone(), 1),
    );

    assert_eq!(session.run_turn().await, TurnOutcome::Skipped);
    assert_eq!(session.run_turn().await, TurnOutcome::Skipped);
    assert_eq!(session.run_turn().await, TurnOutcome::Closed);
    assert!(log.events().is_empty());
}

#[tokio::test]
async fn test_run_ends_when_input_closes() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["", "hello", ""]),
        VisionScript::NoCamera,
        FakeChat::numbered(log.clone(), 5),
    );

    // "hello" and the closing turn count; silence does not
    assert_eq!(session.run().await, 2);
    assert_eq!(log.spoken(), vec![persona().greeting, "reply 1".to_string()]);
}

#[tokio::test]
async fn test_vision_path_skips_chat_and_history() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["What do you think of me"]),
        VisionScript::Describe("A radiant smile.".to_string()),
        FakeChat::numbered(log.clone(), 5),
    );

    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Vision(VisionOutcome::Described)
    );

    assert_eq!(
        log.spoken(),
        vec![persona().look_filler, "A radiant smile.".to_string()]
    );
    assert!(log.chat_requests().is_empty());
    assert!(session.history().is_empty());

    let prompts: Vec<String> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Described { prompt } => Some(prompt),
            _ => None,
        })
        .collect();
    assert_eq!(prompts, vec![persona().vision_request("what do you think of me")]);
}

#[tokio::test]
async fn test_camera_failure_apologizes() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["take photo"]),
        VisionScript::NoCamera,
        FakeChat::numbered(log.clone(), 5),
    );

    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Vision(VisionOutcome::CameraFailed)
    );
    assert_eq!(
        log.spoken(),
        vec![persona().look_filler, persona().camera_apology]
    );
    assert_eq!(log.count(|e| matches!(e, Event::Described { .. })), 0);
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_analysis_failure_apologizes() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["how do i look today"]),
        VisionScript::AnalysisFails,
        FakeChat::numbered(log.clone(), 5),
    );

    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Vision(VisionOutcome::AnalysisFailed)
    );
    assert_eq!(
        log.spoken(),
        vec![persona().look_filler, persona().analysis_apology]
    );
    assert!(log.chat_requests().is_empty());
}

#[tokio::test]
async fn test_empty_description_apologizes() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["analyze me"]),
        VisionScript::Describe("   ".to_string()),
        FakeChat::numbered(log.clone(), 5),
    );

    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Vision(VisionOutcome::AnalysisFailed)
    );
    assert_eq!(
        log.spoken(),
        vec![persona().look_filler, persona().analysis_apology]
    );
}

#[tokio::test]
async fn test_chat_path_never_touches_camera() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["Tell me a story"]),
        VisionScript::Describe("unused".to_string()),
        FakeChat::numbered(log.clone(), 5),
    );

    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Chat(ChatOutcome::Replied)
    );
    assert_eq!(log.count(|e| matches!(e, Event::Captured)), 0);

    let requests = log.chat_requests();
    assert_eq!(requests.len(), 1);
    let messages = &requests[0];
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[0].content, persona().system_prompt);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "tell me a story");

    assert_eq!(log.spoken(), vec!["reply 1".to_string()]);
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().entries()[1].content, "reply 1");
}

#[tokio::test]
async fn test_history_window_bounds_requests() {
    let log = Log::default();
    let questions: Vec<String> = (1..=8).map(|n| format!("question {n}")).collect();
    let lines: Vec<&str> = questions.iter().map(String::as_str).collect();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&lines),
        VisionScript::NoCamera,
        FakeChat::numbered(log.clone(), 8),
    );

    for _ in 0..8 {
        assert_eq!(
            session.run_turn().await,
            TurnOutcome::Chat(ChatOutcome::Replied)
        );
    }

    // Full history keeps every exchange
    assert_eq!(session.history().len(), 16);

    let window = session.options().history_window;
    for (turn, messages) in log.chat_requests().iter().enumerate() {
        assert!(messages.len() <= window + 2);
        assert_eq!(messages.len(), (turn * 2).min(window) + 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages.last().unwrap().content, questions[turn]);
    }

    // The last request carries the three most recent exchanges
    let last = log.chat_requests().pop().unwrap();
    assert_eq!(last[1].content, "question 5");
    assert_eq!(last[6].content, "reply 7");
}

#[tokio::test]
async fn test_chat_failure_leaves_history_unchanged() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["hello", "are you there", "still there?"]),
        VisionScript::NoCamera,
        FakeChat::new(
            log.clone(),
            vec![
                Ok("hi".to_string()),
                Err(Error::Remote {
                    service: "chat",
                    status: 500,
                    body: "boom".to_string(),
                }),
                Ok("  ".to_string()),
            ],
        ),
    );

    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Chat(ChatOutcome::Replied)
    );
    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Chat(ChatOutcome::NoResponse)
    );
    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Chat(ChatOutcome::NoResponse)
    );

    assert_eq!(session.history().len(), 2);
    assert_eq!(
        log.spoken(),
        vec![
            "hi".to_string(),
            persona().chat_apology,
            persona().chat_apology
        ]
    );
}

#[tokio::test]
async fn test_unreachable_chat_keeps_session_alive() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["one", "two", "goodbye"]),
        VisionScript::NoCamera,
        FakeChat::new(log.clone(), Vec::new()),
    );

    assert_eq!(session.run().await, 3);
    assert_eq!(
        log.spoken(),
        vec![
            persona().greeting,
            persona().chat_apology,
            persona().chat_apology,
            persona().farewell
        ]
    );
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_wake_phrase_is_stripped_not_required() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["Mirror mirror tell me a joke", "mirror mirror", "tell me a joke"]),
        VisionScript::NoCamera,
        FakeChat::numbered(log.clone(), 5),
    );

    for _ in 0..3 {
        assert_eq!(
            session.run_turn().await,
            TurnOutcome::Chat(ChatOutcome::Replied)
        );
    }

    // A bare wake phrase still reaches the chat path, as said
    let asked: Vec<String> = log
        .chat_requests()
        .iter()
        .map(|messages| messages.last().unwrap().content.clone())
        .collect();
    assert_eq!(asked, vec!["tell me a joke", "mirror mirror", "tell me a joke"]);
    assert_eq!(
        log.spoken(),
        vec![
            "reply 1".to_string(),
            "reply 2".to_string(),
            "reply 3".to_string()
        ]
    );
    assert_eq!(session.history().len(), 6);
}

#[tokio::test]
async fn test_wake_phrase_in_front_of_vision_request() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["mirror mirror how do i look"]),
        VisionScript::Describe("Splendid.".to_string()),
        FakeChat::numbered(log.clone(), 5),
    );

    assert_eq!(
        session.run_turn().await,
        TurnOutcome::Vision(VisionOutcome::Described)
    );
    assert!(log.chat_requests().is_empty());
    assert!(log.events().contains(&Event::Described {
        prompt: persona().vision_request("how do i look"),
    }));
}

#[tokio::test]
async fn test_exit_word_formed_by_stripping_says_farewell() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::lines(&["stomirror mirrorp"]),
        VisionScript::NoCamera,
        FakeChat::numbered(log.clone(), 5),
    );

    assert_eq!(session.run_turn().await, TurnOutcome::Exit);
    assert_eq!(log.spoken(), vec![persona().farewell]);
    assert!(log.chat_requests().is_empty());
}

#[tokio::test]
async fn test_ask_with_visual_context() {
    let log = Log::default();
    let mut session = fake_session(
        &log,
        ScriptedInput::new(Vec::new()),
        VisionScript::Describe("a person in a red scarf".to_string()),
        FakeChat::numbered(log.clone(), 1),
    );

    let visual = session
        .observe("describe the person")
        .await
        .expect("observe should succeed");
    assert_eq!(
        session.ask_with_context("does this suit me?", Some(&visual)).await,
        ChatOutcome::Replied
    );

    let requests = log.chat_requests();
    assert_eq!(
        requests[0].last().unwrap().content,
        "does this suit me?\n\n[VISUAL INPUT: a person in a red scarf]"
    );
    // observe never speaks
    assert_eq!(log.spoken(), vec!["reply 1".to_string()]);
}
