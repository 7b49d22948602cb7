mod helpers;

use std::time::Duration;

use aiforge::inference::credentials::{CredentialSlot, Credentials};
use aiforge::inference::{
    Attachment, ChatMessage, ChatSession, InferenceDispatcher, ProviderEndpoints, ProviderError,
    SendOutcome,
};
use aiforge::projects::catalog::find_model;
use aiforge::projects::{ModelOption, Project, Provider};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project_on(model_id: &str) -> Project {
    let mut project = Project::new_default("Routed");
    project.model = find_model(model_id).unwrap();
    project
}

async fn only_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests[0].body_json().unwrap()
}

#[tokio::test]
async fn mock_reply_is_deterministic_and_offline() {
    let dispatcher = InferenceDispatcher::new(reqwest::Client::new(), ProviderEndpoints::default());
    let project = Project::new_default("Offline");

    let first = dispatcher
        .preview(&project, "Hello", &Credentials::default())
        .await
        .unwrap();
    let second = dispatcher
        .preview(&project, "Hello", &Credentials::default())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert!(first.starts_with(
        "Mocked AWS/Claude 3 Opus (temp=0.7, tokens=1024) with RAG(disabled), memory(window=20)."
    ));
    assert!(first.contains("Input: Hello"));
}

#[tokio::test]
async fn stub_and_unmatched_routes_make_no_request() {
    let server = MockServer::start().await;
    let dispatcher = helpers::dispatcher_for(&server.uri());

    // Default project runs on the AWS family
    let aws = Project::new_default("Stub");
    let reply = dispatcher
        .preview(&aws, "Hi", &helpers::single_key(CredentialSlot::Aws, "aws-key"))
        .await
        .unwrap();
    assert_eq!(
        reply,
        "AWS API call placeholder for model claude3_opus. Your prompt: Hi. \
         Configure an AWS endpoint to enable real calls."
    );

    let mut nova = Project::new_default("Nova");
    nova.model = ModelOption {
        provider: Provider::Nova,
        id: "nova-pro".into(),
        label: "Nova Pro".into(),
        context_window: 300_000,
        description: String::new(),
    };
    let reply = dispatcher
        .preview(&nova, "Hi", &helpers::single_key(CredentialSlot::Nova, "nova-key"))
        .await
        .unwrap();
    assert!(reply.ends_with("Configure a Nova endpoint to enable real calls."));

    let reply = dispatcher
        .preview(&aws, "Hi", &helpers::single_key(CredentialSlot::OpenAi, "sk-test"))
        .await
        .unwrap();
    assert_eq!(reply, "No matching provider key for AWS. Prompt: Hi");

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn openai_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(helpers::completion_body("Hello back")))
        .expect(1)
        .mount(&server)
        .await;

    let mut project = project_on("gpt4o");
    project.system_instructions = "Be kind".into();
    project.temperature = 0.3;
    project.output_tokens = 256;

    let reply = helpers::dispatcher_for(&server.uri())
        .chat_once(
            &project,
            &[ChatMessage::user("Hi"), ChatMessage::assistant("Hey"), ChatMessage::user("Again")],
            &helpers::single_key(CredentialSlot::OpenAi, "sk-test"),
        )
        .await
        .unwrap();
    assert_eq!(reply, "Hello back");

    let body = only_request_body(&server).await;
    assert_eq!(
        body,
        json!({
            "model": "gpt4o",
            "messages": [
                { "role": "system", "content": "Be kind" },
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hey" },
                { "role": "user", "content": "Again" }
            ],
            "max_tokens": 256,
            "temperature": 0.3
        })
    );
}

#[tokio::test]
async fn openai_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = helpers::dispatcher_for(&server.uri())
        .preview(
            &project_on("gpt4o"),
            "Hi",
            &helpers::single_key(CredentialSlot::OpenAi, "bad"),
        )
        .await
        .unwrap_err();

    match &err {
        ProviderError::Http { provider, status, body } => {
            assert_eq!(*provider, "OpenAI");
            assert_eq!(*status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected an HTTP error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "OpenAI error: 401 invalid api key");
}

#[tokio::test]
async fn empty_choices_yield_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let reply = helpers::dispatcher_for(&server.uri())
        .preview(
            &project_on("gpt4o"),
            "Hi",
            &helpers::single_key(CredentialSlot::OpenAi, "sk-test"),
        )
        .await
        .unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn gemini_key_travels_as_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(helpers::gemini_body("Gemini says hi")))
        .expect(1)
        .mount(&server)
        .await;

    let mut project = project_on("gemini-2.0-flash");
    project.system_instructions = "Sys".into();

    let reply = helpers::dispatcher_for(&server.uri())
        .chat_once(
            &project,
            &[ChatMessage::user("Hi"), ChatMessage::assistant("Yo"), ChatMessage::user("More")],
            &helpers::single_key(CredentialSlot::Gemini, "g-key"),
        )
        .await
        .unwrap();
    assert_eq!(reply, "Gemini says hi");

    let body = only_request_body(&server).await;
    assert_eq!(
        body,
        json!({
            "contents": [
                { "role": "user", "parts": [{ "text": "Sys" }] },
                { "role": "user", "parts": [{ "text": "user: Hi\nassistant: Yo\nuser: More" }] }
            ],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 1024 }
        })
    );
}

#[tokio::test]
async fn meta_sends_non_streaming_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer llama-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(helpers::completion_body("Llama reply")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = helpers::dispatcher_for(&server.uri())
        .preview(
            &project_on("Llama-4-Scout-17B-16E-Instruct-FP8"),
            "Hi",
            &helpers::single_key(CredentialSlot::Meta, "llama-key"),
        )
        .await
        .unwrap();
    assert_eq!(reply, "Llama reply");

    let body = only_request_body(&server).await;
    assert_eq!(body["stream"], false);
    assert_eq!(body["model"], "Llama-4-Scout-17B-16E-Instruct-FP8");
}

#[tokio::test]
async fn meta_failures_are_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = helpers::dispatcher_for(&server.uri())
        .preview(
            &project_on("Llama-4-Scout-17B-16E-Instruct-FP8"),
            "Hi",
            &helpers::single_key(CredentialSlot::Meta, "llama-key"),
        )
        .await
        .unwrap_err();

    match &err {
        ProviderError::Call { provider, message } => {
            assert_eq!(*provider, "Llama API");
            assert_eq!(message, "Llama API error: 500 boom");
        }
        other => panic!("expected a wrapped call error, got {other:?}"),
    }
}

#[tokio::test]
async fn session_records_turns_in_mock_mode() {
    let dispatcher = InferenceDispatcher::new(reqwest::Client::new(), ProviderEndpoints::default());
    let session = ChatSession::new(dispatcher, Project::new_default("Viewer"));

    let note = Attachment::from_bytes("notes.txt", None, b"mitochondria");
    let outcome = session
        .send("Summarize", &[note], &Credentials::default())
        .await
        .unwrap();

    let SendOutcome::Reply(reply) = outcome else {
        panic!("expected a reply");
    };
    assert!(reply.contains("Input: Summarize"));
    assert!(reply.contains("mitochondria"));

    let transcript = session.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0], ChatMessage::user("Summarize"));
    assert_eq!(transcript[1], ChatMessage::assistant(reply));
}

#[tokio::test]
async fn newer_send_supersedes_older_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(helpers::completion_body("fast reply")))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(helpers::completion_body("slow reply"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let session = ChatSession::new(helpers::dispatcher_for(&server.uri()), project_on("gpt4o"));
    let credentials = helpers::single_key(CredentialSlot::OpenAi, "sk-test");

    let (slow, fast) = tokio::join!(session.send("slow", &[], &credentials), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.send("fast", &[], &credentials).await
    });

    assert_eq!(slow.unwrap(), SendOutcome::Superseded);
    assert_eq!(fast.unwrap(), SendOutcome::Reply("fast reply".into()));

    let transcript = session.transcript();
    assert_eq!(transcript.last(), Some(&ChatMessage::assistant("fast reply")));
    assert!(!transcript.iter().any(|m| m.content == "slow reply"));
}
