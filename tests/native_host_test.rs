mod common;

use common::{create_notes_folder, read_note, write_note};
use kodegen_tools_clipper::config::{JsonFileStore, MemoryStore};
use kodegen_tools_clipper::file_store::MemoryCapabilityStore;
use kodegen_tools_clipper::image_pipeline::ImageDownloader;
use kodegen_tools_clipper::native_host::{
    MAX_OUTBOUND_MESSAGE_BYTES, NativeHost, read_frame,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

fn memory_host() -> NativeHost {
    NativeHost::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryCapabilityStore::new()),
        ImageDownloader::new().expect("HTTP client builds"),
    )
}

/// Frame one inbound request; browser-to-host messages are not bound by
/// the outbound cap that `write_message` enforces
fn frame(request: &Value) -> anyhow::Result<Vec<u8>> {
    let body = serde_json::to_vec(request)?;
    let mut bytes = (body.len() as u32).to_ne_bytes().to_vec();
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Feed `requests` through the framed loop and decode every response
async fn exchange(host: &NativeHost, requests: &[Value]) -> anyhow::Result<Vec<Value>> {
    let mut input = Vec::new();
    for request in requests {
        input.extend_from_slice(&frame(request)?);
    }

    let mut output = Vec::new();
    host.serve(&mut input.as_slice(), &mut output).await?;

    let mut reader = output.as_slice();
    let mut responses = Vec::new();
    while let Some(body) = read_frame(&mut reader).await? {
        responses.push(serde_json::from_slice(&body)?);
    }
    Ok(responses)
}

async fn send(host: &NativeHost, request: Value) -> anyhow::Result<Value> {
    let mut responses = exchange(host, &[request]).await?;
    Ok(responses.remove(0))
}

#[tokio::test]
async fn test_get_config_defaults() -> anyhow::Result<()> {
    let host = memory_host();

    let response = send(&host, json!({"action": "getConfig", "requestId": 1})).await?;

    assert_eq!(response["success"], true);
    assert_eq!(response["requestId"], 1);
    assert_eq!(response["data"]["appendOnConflict"], true);
    assert_eq!(response["data"]["quickSaveMode"], true);
    assert_eq!(response["data"]["imageMode"], "url");
    assert_eq!(response["data"]["prefixText"], "");
    Ok(())
}

#[tokio::test]
async fn test_save_config_merges_partial_settings() -> anyhow::Result<()> {
    let state = TempDir::new()?;
    let host = NativeHost::new(
        Arc::new(JsonFileStore::new(state.path().join("settings.json"))),
        Arc::new(MemoryCapabilityStore::new()),
        ImageDownloader::new()?,
    );

    let responses = exchange(
        &host,
        &[
            json!({"action": "saveConfig", "config": {"imageMode": "download", "bogus": 1}}),
            json!({"action": "saveConfig", "config": {"suffixText": "#web"}}),
            json!({"action": "getConfig"}),
        ],
    )
    .await?;

    assert!(responses.iter().all(|r| r["success"] == true));
    let config = &responses[2]["data"];
    assert_eq!(config["imageMode"], "download");
    assert_eq!(config["suffixText"], "#web");

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(
        state.path().join("settings.json"),
    )?)?;
    assert_eq!(stored["imageMode"], "download");
    assert!(stored.get("bogus").is_none());
    Ok(())
}

#[tokio::test]
async fn test_folder_then_listing() -> anyhow::Result<()> {
    let (dir, _folder) = create_notes_folder()?;
    write_note(dir.path(), "a.md", "", 50)?;
    write_note(dir.path(), "b.md", "", 1)?;
    let host = memory_host();

    let responses = exchange(
        &host,
        &[
            json!({"action": "getMarkdownFiles"}),
            json!({"action": "setFolder", "path": dir.path()}),
            json!({"action": "getFolder"}),
            json!({"action": "getMarkdownFiles"}),
        ],
    )
    .await?;

    assert_eq!(responses[0]["success"], false);
    assert_eq!(responses[0]["error"]["kind"], "notConfigured");

    assert_eq!(responses[1]["success"], true);
    // choosing a folder rebuilds the quick-save menu
    let menu = responses[1]["menu"].as_array().expect("menu");
    assert!(menu.iter().any(|item| item["id"] == "file_0" && item["title"] == "b.md"));

    assert_eq!(responses[2]["data"]["permission"], "granted");

    let names: Vec<&str> = responses[3]["data"]
        .as_array()
        .expect("file list")
        .iter()
        .filter_map(|f| f["name"].as_str())
        .collect();
    assert_eq!(names, vec!["b.md", "a.md"]);
    Ok(())
}

#[tokio::test]
async fn test_capture_through_picker() -> anyhow::Result<()> {
    let (dir, _folder) = create_notes_folder()?;
    let host = memory_host();
    send(&host, json!({"action": "setFolder", "path": dir.path()})).await?;

    let captured = send(
        &host,
        json!({
            "action": "capture",
            "trigger": {"type": "saveSelection"},
            "page": {"url": "https://a.test", "title": "T"},
            "selection": {"text": "hi", "html": "", "images": []}
        }),
    )
    .await?;

    assert_eq!(captured["success"], true);
    assert_eq!(captured["data"]["status"], "awaitingDestination");
    let ticket = captured["openPicker"].clone();
    assert_eq!(captured["data"]["ticket"], ticket);

    let context = send(&host, json!({"action": "getPickerContext", "ticket": ticket})).await?;
    assert_eq!(context["data"]["textPreview"], "hi");
    assert_eq!(context["data"]["suggestedFileName"], "T.md");
    assert_eq!(context["data"]["page"]["title"], "T");

    let saved = send(
        &host,
        json!({
            "action": "saveToFile",
            "ticket": ticket,
            "fileSelection": {"type": "new", "fileName": "inbox"}
        }),
    )
    .await?;

    assert_eq!(saved["success"], true);
    assert_eq!(saved["data"]["fileName"], "inbox.md");
    assert_eq!(saved["notifications"][0]["severity"], "success");
    assert_eq!(saved["notifications"][0]["message"], "Saved to: inbox.md");
    assert_eq!(read_note(dir.path(), "inbox.md"), "[T](https://a.test)\n\nhi");
    Ok(())
}

#[tokio::test]
async fn test_capture_without_folder_asks_for_settings() -> anyhow::Result<()> {
    let host = memory_host();

    let response = send(
        &host,
        json!({
            "action": "capture",
            "trigger": {"type": "quickSaveNew"},
            "page": {"url": "https://a.test", "title": "T"},
            "selection": {"text": "hi"}
        }),
    )
    .await?;

    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "notConfigured");
    assert_eq!(response["openSettings"], true);
    assert_eq!(response["notifications"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_capture_without_page_script() -> anyhow::Result<()> {
    let (dir, _folder) = create_notes_folder()?;
    let host = memory_host();
    send(&host, json!({"action": "setFolder", "path": dir.path()})).await?;

    let response = send(
        &host,
        json!({
            "action": "capture",
            "trigger": {"type": "quickSaveNew"},
            "page": {"url": "https://a.test", "title": "T"}
        }),
    )
    .await?;

    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["kind"], "unknown");
    assert_eq!(response["openSettings"], false);
    Ok(())
}

#[tokio::test]
async fn test_bad_requests_get_error_responses() -> anyhow::Result<()> {
    let host = memory_host();

    let unknown = host.handle_message(br#"{"action": "launchRockets"}"#).await;
    let malformed = host.handle_message(b"{not json").await;

    assert!(!unknown.success);
    assert!(!malformed.success);
    assert_eq!(
        serde_json::to_value(&malformed)?["error"]["kind"],
        "invalidInput"
    );
    Ok(())
}

#[tokio::test]
async fn test_refresh_menu_classic_mode() -> anyhow::Result<()> {
    let host = memory_host();

    let responses = exchange(
        &host,
        &[
            json!({"action": "saveConfig", "config": {"quickSaveMode": false}}),
            json!({"action": "refreshMenu"}),
        ],
    )
    .await?;

    let menu = responses[1]["menu"].as_array().expect("menu");
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0]["id"], "saveToNotes");
    Ok(())
}

#[tokio::test]
async fn test_picker_context_for_huge_selection() -> anyhow::Result<()> {
    let (dir, _folder) = create_notes_folder()?;
    let host = memory_host();
    send(&host, json!({"action": "setFolder", "path": dir.path()})).await?;

    let html = "<p>lorem ipsum dolor</p>".repeat(50_000);
    let text = "lorem ipsum dolor\n".repeat(50_000);
    assert!(html.len() + text.len() > MAX_OUTBOUND_MESSAGE_BYTES);

    let captured = send(
        &host,
        json!({
            "action": "capture",
            "trigger": {"type": "saveSelection"},
            "page": {"url": "https://a.test/long", "title": "Long read"},
            "selection": {"text": text, "html": html, "images": []}
        }),
    )
    .await?;
    assert_eq!(captured["data"]["status"], "awaitingDestination");
    let ticket = captured["openPicker"].clone();

    let context = send(&host, json!({"action": "getPickerContext", "ticket": ticket})).await?;

    assert_eq!(context["success"], true, "{context}");
    assert_eq!(context["data"]["textTruncated"], true);
    assert_eq!(context["data"]["suggestedFileName"], "Long read.md");
    assert!(context["data"]["textPreview"].as_str().is_some_and(|p| p.starts_with("lorem")));

    let saved = send(
        &host,
        json!({
            "action": "saveToFile",
            "ticket": ticket,
            "fileSelection": {"type": "new", "fileName": "long"}
        }),
    )
    .await?;
    assert_eq!(saved["success"], true, "{saved}");
    assert!(read_note(dir.path(), "long.md").len() > text.len());
    Ok(())
}

#[tokio::test]
async fn test_oversized_reply_becomes_error() -> anyhow::Result<()> {
    let host = memory_host();
    let prefix = "p".repeat(MAX_OUTBOUND_MESSAGE_BYTES + 10);

    let responses = exchange(
        &host,
        &[
            json!({"action": "saveConfig", "config": {"prefixText": prefix}}),
            json!({"action": "getConfig", "requestId": "big"}),
        ],
    )
    .await?;

    assert_eq!(responses[0]["success"], true);
    assert_eq!(responses[1]["success"], false);
    assert_eq!(responses[1]["requestId"], "big");
    assert_eq!(responses[1]["error"]["kind"], "invalidInput");
    Ok(())
}
