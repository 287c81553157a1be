use serde_json::Value;
use std::process::{Child, Command};
use std::time::Duration;

const SAMPLE_CORPUS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/sample-kjv.csv");
const SAMPLE_READINGS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/readings.toml");

/// Helper to find a free port
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Helper to wait for the service to be ready
fn wait_for_service(base_url: &str, timeout: Duration) -> bool {
    let client = reqwest::blocking::Client::new();
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if client.get(format!("{}/status", base_url)).send().is_ok() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    false
}

struct Service {
    child: Child,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl Service {
    fn start(extra: &[&str]) -> Self {
        let port = free_port();
        let base_url = format!("http://127.0.0.1:{}", port);
        let child = Command::new(env!("CARGO_BIN_EXE_lectio-service"))
            .args(["--port", &port.to_string()])
            .args(extra)
            .spawn()
            .expect("Failed to start lectio-service");

        assert!(
            wait_for_service(&base_url, Duration::from_secs(5)),
            "Service failed to start"
        );

        Self {
            child,
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn sample() -> Self {
        Self::start(&["--corpus", SAMPLE_CORPUS, "--readings", SAMPLE_READINGS])
    }

    fn get(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().unwrap())
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn verse_refs(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| format!("{} {}:{}", v["book"].as_str().unwrap(), v["chapter"], v["verse"]))
        .collect()
}

#[test]
fn test_books_and_testaments() {
    let service = Service::sample();

    let (status, books) = service.get("/scripture?action=books");
    assert_eq!(status, 200);
    let books = books.as_array().unwrap();
    assert_eq!(books.len(), 11);
    assert_eq!(books[0]["name"], "Genesis");
    assert_eq!(books[0]["id"], 1);

    let (_, old) = service.get("/scripture?action=testament-books&testament=old");
    let (_, new) = service.get("/scripture?action=testament-books&testament=new");
    let old = old.as_array().unwrap();
    let new = new.as_array().unwrap();
    assert_eq!(old.len() + new.len(), books.len());
    assert!(old.iter().all(|b| b["id"].as_u64().unwrap() <= 39));
    assert!(new.iter().all(|b| b["id"].as_u64().unwrap() > 39));

    let (status, err) = service.get("/scripture?action=testament-books&testament=apocrypha");
    assert_eq!(status, 400);
    assert_eq!(err["code"], "bad_request");
}

#[test]
fn test_chapter_and_verse_lookup() {
    let service = Service::sample();

    let (status, chapter) = service.get("/scripture?action=chapter&bookId=19&chapter=23");
    assert_eq!(status, 200);
    let refs = verse_refs(&chapter);
    assert_eq!(refs.len(), 6);
    assert_eq!(refs[0], "Psalms 23:1");
    assert_eq!(refs[5], "Psalms 23:6");

    let (_, empty) = service.get("/scripture?action=chapter&bookId=19&chapter=150");
    assert!(empty.as_array().unwrap().is_empty());

    let (status, verse) = service.get("/scripture?action=verse&bookId=43&chapter=3&verse=16");
    assert_eq!(status, 200);
    assert_eq!(verse["bookId"], 43);
    assert!(verse["text"].as_str().unwrap().starts_with("For God so loved the world"));

    let (status, err) = service.get("/scripture?action=verse&bookId=43&chapter=3&verse=99");
    assert_eq!(status, 404);
    assert_eq!(err["code"], "not_found");

    let (status, _) = service.get("/scripture?action=verse&bookId=43&chapter=3");
    assert_eq!(status, 400);
}

#[test]
fn test_search_modes() {
    let service = Service::sample();

    let (status, resp) = service.get("/scripture?action=search&q=john%203:16");
    assert_eq!(status, 200);
    assert_eq!(verse_refs(&resp["verses"]), vec!["John 3:16"]);

    let (_, resp) = service.get("/scripture?action=search&q=psalms%2023");
    assert_eq!(verse_refs(&resp["verses"]).len(), 6);

    let (_, resp) = service.get("/scripture?action=search&q=%22my%20shepherd%22");
    assert_eq!(verse_refs(&resp["verses"]), vec!["Psalms 23:1"]);

    let (_, resp) = service.get("/scripture?action=search&q=faith%20hope");
    assert_eq!(
        verse_refs(&resp["verses"]),
        vec!["1 Corinthians 13:13", "Hebrews 11:1"]
    );

    let (_, resp) = service.get("/scripture?action=search&q=leviathan");
    assert!(resp["verses"].as_array().unwrap().is_empty());

    let (status, err) = service.get("/scripture?action=search&q=a");
    assert_eq!(status, 400);
    assert!(err["message"].as_str().unwrap().contains("at least 2"));
}

#[test]
fn test_daily_is_deterministic() {
    let service = Service::sample();

    let (status, first) = service.get("/scripture?action=daily&date=2024-01-01");
    assert_eq!(status, 200);
    let (_, second) = service.get("/scripture?action=daily&date=2024-01-01");
    assert_eq!(first, second);
    assert_eq!(first["date"], "2024-01-01");
    assert_eq!(first["verse"]["book"], "Proverbs");
    assert_eq!(first["verse"]["chapter"], 3);
    assert_eq!(first["verse"]["verse"], 5);
    assert!(first["passage"]
        .as_str()
        .unwrap()
        .starts_with("Proverbs 3:5 - Trust in the LORD"));

    let (status, _) = service.get("/scripture?action=daily&date=01/01/2024");
    assert_eq!(status, 400);

    let (status, random) = service.get("/scripture?action=random");
    assert_eq!(status, 200);
    assert!(random["verse"]["text"].is_string());
}

#[test]
fn test_passage_and_readings() {
    let service = Service::sample();

    let (status, resp) = service.get("/scripture?action=passage&q=labour&limit=1");
    assert_eq!(status, 200);
    assert!(resp["passage"]
        .as_str()
        .unwrap()
        .starts_with("Matthew 11:28 - Come unto me"));

    let (_, resp) = service.get("/scripture?action=passage&q=leviathan");
    assert_eq!(resp["passage"], "No relevant verses found.");

    let (status, resp) = service.get("/readings/today?date=2024-01-01");
    assert_eq!(status, 200);
    assert_eq!(resp["reading"]["id"], 1);
    assert!(resp["passage"].as_str().unwrap().starts_with("Proverbs 6:6 - Go to the ant"));

    let (status, resp) = service.get("/readings/search?q=confession");
    assert_eq!(status, 200);
    assert_eq!(resp.as_array().unwrap()[0]["book"], "1 John");
}

#[test]
fn test_bad_requests_and_status() {
    let service = Service::sample();

    let (status, err) = service.get("/scripture");
    assert_eq!(status, 400);
    assert_eq!(err["code"], "bad_request");
    assert!(err["hint"].is_string());

    let (status, _) = service.get("/scripture?action=psalm");
    assert_eq!(status, 400);

    // Any scripture request forces the load
    service.get("/scripture?action=books");
    let (status, resp) = service.get("/status");
    assert_eq!(status, 200);
    assert_eq!(resp["loaded"], true);
    assert_eq!(resp["verses"], 29);
    assert_eq!(resp["readings"], 6);
}

#[test]
fn test_missing_corpus_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");
    let service = Service::start(&["--corpus", missing.to_str().unwrap()]);

    let (status, books) = service.get("/scripture?action=books");
    assert_eq!(status, 200);
    assert!(books.as_array().unwrap().is_empty());

    let (_, resp) = service.get("/scripture?action=search&q=love");
    assert!(resp["verses"].as_array().unwrap().is_empty());

    let (status, err) = service.get("/scripture?action=daily&date=2024-01-01");
    assert_eq!(status, 500);
    assert_eq!(err["code"], "corpus_unavailable");

    let (status, _) = service.get("/readings/today");
    assert_eq!(status, 404);

    let (_, resp) = service.get("/status");
    assert_eq!(resp["loaded"], false);
}
