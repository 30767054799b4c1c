//! End-to-end tests of the agent turn loop against scripted backends
//! and the in-memory demo store.

mod common;

use std::sync::Arc;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use box_agent::agent::{BoxAgent, DisplayEvent};
use box_agent::config::AgentConfig;
use box_agent::error::BoxAgentError;
use box_agent::provider::ChatReply;
use box_agent::types::{Role, ToolInvocation};

use common::{demo_catalog, invocation_reply, GatedProvider, RepeatingProvider, ScriptedProvider};

fn agent_with(provider: Arc<ScriptedProvider>) -> BoxAgent {
    BoxAgent::new(provider, demo_catalog())
}

#[tokio::test]
async fn direct_answer_needs_one_model_call() {
    let provider = Arc::new(ScriptedProvider::new(vec![ChatReply::text(
        "Hello! How can I help with your documents?",
    )]));
    let agent = agent_with(provider.clone());

    let reply = agent.invoke("hello", Some("greeting")).await.unwrap();
    assert_eq!(reply.conversation_id, "greeting");
    assert_eq!(reply.text, "Hello! How can I help with your documents?");
    assert_eq!(provider.calls(), 1);

    // System prompt, user turn, assistant answer. Nothing else.
    let history = agent.history("greeting").await.unwrap();
    let roles: Vec<_> = history.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(history[1].text(), "hello");
}

#[tokio::test]
async fn whoami_turn_dispatches_and_answers() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        invocation_reply("call_1", "whoami", json!({})),
        ChatReply::text("You are logged in as RB Admin."),
    ]));
    let agent = agent_with(provider.clone());

    let reply = agent.invoke("who am i?", Some("c1")).await.unwrap();
    assert_eq!(reply.text, "You are logged in as RB Admin.");
    assert_eq!(provider.calls(), 2);

    let history = agent.history("c1").await.unwrap();
    // system, user, assistant(invocation), tool result, assistant answer
    assert_eq!(history.len(), 5);
    let results = history[3].invocation_results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].invocation_id, "call_1");
    assert_eq!(results[0].result, json!("Authenticated as: RB Admin"));
    assert!(!results[0].is_error);
}

#[tokio::test]
async fn search_results_carry_file_ids() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        invocation_reply(
            "call_1",
            "search",
            json!({ "query": "pdf", "extensions": ["pdf"] }),
        ),
        ChatReply::text(
            "Found three PDFs: Sample PDF A (1584049890463), Sample PDF B \
             (1584052520457), and the Llama 2 paper (1633681461006).",
        ),
    ]));
    let agent = agent_with(provider);

    let reply = agent.invoke("find all pdfs", Some("c2")).await.unwrap();
    assert!(reply.text.contains("1584049890463"));

    let history = agent.history("c2").await.unwrap();
    let results = history[3].invocation_results();
    let matches = results[0].result.as_array().unwrap();
    assert_eq!(matches.len(), 3);
    assert!(matches.iter().all(|m| m["id"].is_string()));
}

#[tokio::test]
async fn loop_bound_is_exact() {
    let provider = Arc::new(RepeatingProvider::new());
    let agent = BoxAgent::new(provider.clone(), demo_catalog())
        .with_config(AgentConfig::default().with_max_tool_loops(3));

    let err = agent.invoke("loop forever", Some("c3")).await.unwrap_err();
    assert!(matches!(err, BoxAgentError::ToolLoopExceeded { limit: 3 }));
    // Exactly three model calls, never a fourth.
    assert_eq!(provider.calls(), 3);

    // Every dispatched invocation still got its result appended.
    let history = agent.history("c3").await.unwrap();
    let results: Vec<_> = history
        .iter()
        .flat_map(|m| m.invocation_results())
        .collect();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn parallel_invocations_correlate_one_to_one() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ChatReply::invocations(vec![
            ToolInvocation {
                id: "call_a".into(),
                name: "whoami".into(),
                arguments: json!({}),
            },
            ToolInvocation {
                id: "call_b".into(),
                name: "list_folder".into(),
                arguments: json!({ "folder_id": "0" }),
            },
        ]),
        ChatReply::text("done"),
    ]));
    let agent = agent_with(provider);

    agent.invoke("who am i and what is here?", Some("c4")).await.unwrap();

    let history = agent.history("c4").await.unwrap();
    let results: Vec<_> = history
        .iter()
        .flat_map(|m| m.invocation_results())
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].invocation_id, "call_a");
    assert_eq!(results[0].operation, "whoami");
    assert_eq!(results[1].invocation_id, "call_b");
    assert_eq!(results[1].operation, "list_folder");
}

#[tokio::test]
async fn failed_operation_is_reported_not_fatal() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        invocation_reply("call_1", "read_text", json!({ "file_id": "no-such-file" })),
        ChatReply::text("That file does not exist."),
    ]));
    let agent = agent_with(provider);

    let reply = agent.invoke("read file no-such-file", Some("c5")).await.unwrap();
    assert_eq!(reply.text, "That file does not exist.");

    let history = agent.history("c5").await.unwrap();
    let results = history[3].invocation_results();
    assert!(results[0].is_error);
    assert!(results[0].result["error"]
        .as_str()
        .unwrap()
        .contains("read_text"));
}

#[tokio::test]
async fn unknown_operation_is_reported_not_fatal() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        invocation_reply("call_1", "teleport", json!({})),
        ChatReply::text("I cannot do that."),
    ]));
    let agent = agent_with(provider);

    let reply = agent.invoke("teleport me", Some("c6")).await.unwrap();
    assert_eq!(reply.text, "I cannot do that.");

    let history = agent.history("c6").await.unwrap();
    let results = history[3].invocation_results();
    assert!(results[0].is_error);
    assert_eq!(results[0].operation, "teleport");
}

#[tokio::test]
async fn invalid_arguments_are_reported_not_fatal() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        // read_text requires file_id.
        invocation_reply("call_1", "read_text", json!({})),
        ChatReply::text("I need a file id."),
    ]));
    let agent = agent_with(provider);

    let reply = agent.invoke("read something", Some("c7")).await.unwrap();
    assert_eq!(reply.text, "I need a file id.");

    let history = agent.history("c7").await.unwrap();
    assert!(history[3].invocation_results()[0].is_error);
}

#[tokio::test]
async fn model_failure_ends_the_turn() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let agent = agent_with(provider);

    let err = agent.invoke("hello", Some("c8")).await.unwrap_err();
    match err {
        BoxAgentError::ModelUnavailable { provider, source } => {
            assert_eq!(provider, "scripted");
            assert!(matches!(*source, BoxAgentError::Api { status: 503, .. }));
        }
        other => panic!("expected ModelUnavailable, got {other}"),
    }
}

#[tokio::test]
async fn concurrent_turn_on_same_conversation_is_busy() {
    let provider = Arc::new(GatedProvider::new());
    let entered = provider.entered.clone();
    let release = provider.release.clone();
    let agent = BoxAgent::new(provider, demo_catalog());

    let racer = agent.clone();
    let first = tokio::spawn(async move { racer.invoke("slow turn", Some("c9")).await });

    entered.notified().await;
    let err = agent.invoke("second turn", Some("c9")).await.unwrap_err();
    assert!(matches!(err, BoxAgentError::ConversationBusy(id) if id == "c9"));

    // A different conversation is unaffected by the held one.
    release.notify_one();
    let reply = first.await.unwrap().unwrap();
    assert_eq!(reply.text, "released");

    // The busy attempt left no trace in the history.
    let history = agent.history("c9").await.unwrap();
    assert_eq!(
        history.iter().filter(|m| m.role == Role::User).count(),
        1
    );
}

#[tokio::test]
async fn streaming_emits_tool_used_then_text() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        invocation_reply("call_1", "whoami", json!({})),
        ChatReply::text("You are logged in as RB Admin."),
    ]));
    let agent = agent_with(provider);

    let reply = agent.invoke_streaming("who am i?", Some("s1")).unwrap();
    let events: Vec<_> = reply
        .events
        .map(|e| e.unwrap())
        .collect::<Vec<_>>()
        .await;

    assert_eq!(
        events,
        vec![
            DisplayEvent::ToolUsed {
                name: "whoami".into()
            },
            DisplayEvent::Text {
                content: "You are logged in as RB Admin.".into()
            },
        ]
    );
}

#[tokio::test]
async fn streaming_never_emits_empty_text() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        invocation_reply("call_1", "whoami", json!({})),
        invocation_reply("call_2", "list_folder", json!({ "folder_id": "0" })),
        ChatReply::text("All done."),
    ]));
    let agent = agent_with(provider);

    let reply = agent.invoke_streaming("explore", Some("s2")).unwrap();
    let events: Vec<_> = reply
        .events
        .map(|e| e.unwrap())
        .collect::<Vec<_>>()
        .await;

    let empty_text = events
        .iter()
        .any(|e| matches!(e, DisplayEvent::Text { content } if content.is_empty()));
    assert!(!empty_text);
    let tools = events
        .iter()
        .filter(|e| matches!(e, DisplayEvent::ToolUsed { .. }))
        .count();
    assert_eq!(tools, 2);
}

#[tokio::test]
async fn streaming_busy_surfaces_before_the_stream() {
    let provider = Arc::new(GatedProvider::new());
    let entered = provider.entered.clone();
    let release = provider.release.clone();
    let agent = BoxAgent::new(provider, demo_catalog());

    let racer = agent.clone();
    let first = tokio::spawn(async move { racer.invoke("slow turn", Some("s3")).await });
    entered.notified().await;

    let err = agent.invoke_streaming("second", Some("s3")).unwrap_err();
    assert!(matches!(err, BoxAgentError::ConversationBusy(_)));

    release.notify_one();
    first.await.unwrap().unwrap();
}

#[tokio::test]
async fn streaming_model_failure_arrives_in_band() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let agent = agent_with(provider);

    let reply = agent.invoke_streaming("hello", Some("s4")).unwrap();
    let items: Vec<_> = reply.events.collect().await;
    assert_eq!(items.len(), 1);
    assert!(matches!(
        items[0],
        Err(BoxAgentError::ModelUnavailable { .. })
    ));
}

#[tokio::test]
async fn follow_up_turn_sees_prior_context() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ChatReply::text("There are three PDFs."),
        ChatReply::text("The first is Sample PDF A."),
    ]));
    let agent = agent_with(provider.clone());

    agent.invoke("how many pdfs?", Some("multi")).await.unwrap();
    agent.invoke("name the first one", Some("multi")).await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    // Second request carries the whole first turn plus the new question.
    assert!(requests[1].messages.len() > requests[0].messages.len());
    let texts: Vec<_> = requests[1].messages.iter().map(|m| m.text()).collect();
    assert!(texts.contains(&"how many pdfs?".to_string()));
    assert!(texts.contains(&"There are three PDFs.".to_string()));
    assert!(texts.contains(&"name the first one".to_string()));
}

#[tokio::test]
async fn generated_conversation_id_is_reusable() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ChatReply::text("first"),
        ChatReply::text("second"),
    ]));
    let agent = agent_with(provider);

    let reply = agent.invoke("start", None).await.unwrap();
    let id = reply.conversation_id.clone();

    let follow_up = agent.invoke("continue", Some(&id)).await.unwrap();
    assert_eq!(follow_up.conversation_id, id);

    let history = agent.history(&id).await.unwrap();
    assert_eq!(
        history.iter().filter(|m| m.role == Role::User).count(),
        2
    );
}

#[tokio::test]
async fn pre_canceled_turn_makes_no_model_call() {
    let provider = Arc::new(ScriptedProvider::new(vec![ChatReply::text("unused")]));
    let agent = agent_with(provider.clone());

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = agent
        .invoke_with_cancellation("hello", Some("c10"), cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, BoxAgentError::Canceled));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn custom_system_prompt_leads_the_context() {
    let provider = Arc::new(ScriptedProvider::new(vec![ChatReply::text("aye")]));
    let agent = BoxAgent::new(provider.clone(), demo_catalog()).with_config(
        AgentConfig::default().with_system_prompt(Some("Answer like a pirate.".into())),
    );

    agent.invoke("hello", Some("c11")).await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert_eq!(requests[0].messages[0].text(), "Answer like a pirate.");
}

#[tokio::test]
async fn requests_carry_the_full_operation_catalog() {
    let provider = Arc::new(ScriptedProvider::new(vec![ChatReply::text("ok")]));
    let agent = agent_with(provider.clone());

    agent.invoke("hello", Some("c12")).await.unwrap();

    let names: Vec<_> = provider.requests()[0]
        .operations
        .iter()
        .map(|op| op.name.clone())
        .collect();
    assert_eq!(
        names,
        vec![
            "whoami",
            "search",
            "read_text",
            "ai_ask",
            "ai_extract",
            "list_folder",
            "find_folder_by_name",
        ]
    );
}
