use std::{
    io::{BufRead, BufReader, Write},
    net::TcpListener,
    thread::{self, JoinHandle},
    time::Duration,
};

use address_verify::{
    batch, AddressInput, AddressRecord, ClientConfig, RecordError, Verification,
    VerificationClient, Verifier, VerifyError,
};

const SAMPLE: &str = r#"[{"input_index":0,"candidate_index":0,"delivery_line_1":"45 Main St Ste 850","last_line":"Brooklyn NY 11201-8200","components":{"primary_number":"45","street_name":"Main","street_suffix":"St","secondary_designator":"Ste","secondary_number":"850","city_name":"Brooklyn","state_abbreviation":"NY","zipcode":"11201","plus4_code":"8200"},"metadata":{"record_type":"H","latitude":40.70306,"longitude":-73.99034},"analysis":{"dpv_match_code":"Y","dpv_footnotes":"AABB"}}]"#;

/// Serves exactly one HTTP response and hands back the request line it got.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/street-address", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }

        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();
        request_line
    });

    (endpoint, handle)
}

fn client(endpoint: &str) -> VerificationClient {
    VerificationClient::new(
        ClientConfig::new("my-id", "my-token")
            .with_endpoint(endpoint)
            .with_timeout(Duration::from_secs(5)),
    )
}

fn valid_record() -> AddressRecord {
    AddressRecord {
        firstname: "John".into(),
        lastname: "Doe".into(),
        phone: "555-123-4567".into(),
        address1: "45 Main Street".into(),
        address2: Some("Suite 850".into()),
        city: "Brooklyn".into(),
        state: "NY".into(),
        zipcode: "11201".into(),
        country: "US".into(),
        ..AddressRecord::default()
    }
}

#[test]
fn verifies_over_http() {
    let (endpoint, server) = serve_once("200 OK", SAMPLE);
    let mut record = valid_record();

    assert!(record.validate(&client(&endpoint)).unwrap());
    assert_eq!(record.address1, "45 Main St");
    assert_eq!(record.address2.as_deref(), Some("Ste 850"));
    assert_eq!(record.zipcode, "11201-8200");

    let request_line = server.join().unwrap();
    assert!(request_line.starts_with("GET /street-address?"), "{request_line}");
    assert!(request_line.contains("auth-id=my-id"));
    assert!(request_line.contains("auth-token=my-token"));
    assert!(request_line.contains("secondary=Suite"));
}

#[test]
fn sparse_candidate_does_not_blank_the_record() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"[{"delivery_line_1":"45 Main St","last_line":"Brooklyn NY 11201-8200"}]"#,
    );
    let mut record = valid_record();

    assert!(record.validate(&client(&endpoint)).unwrap());
    assert_eq!(record.city, "Brooklyn");
    assert_eq!(record.state, "NY");
    assert_eq!(record.zipcode, "11201-8200");
    server.join().unwrap();
}

#[test]
fn empty_array_is_not_deliverable() {
    let (endpoint, server) = serve_once("200 OK", "[]");
    let input = valid_record().to_input();

    assert_eq!(
        client(&endpoint).verify(&input),
        Ok(Verification::NotDeliverable)
    );
    server.join().unwrap();
}

#[test]
fn server_error_bubbles_up() {
    let (endpoint, server) = serve_once("500 Internal Server Error", "{\"error\":\"down\"}");
    let mut record = valid_record();

    let err = record.validate(&client(&endpoint)).unwrap_err();
    match err {
        RecordError::Verify(VerifyError::Provider { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "{\"error\":\"down\"}");
        }
        x => panic!("expected provider error, got {x:?}"),
    }
    assert!(record.errors.is_empty());
    server.join().unwrap();
}

#[test]
fn unreachable_provider_is_transient() {
    // bind then drop to get a port nothing listens on
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let input = AddressInput {
        street: "123 W 117th Street".into(),
        secondary: None,
        city: "New York".into(),
        state: "NY".into(),
        zipcode: "10026".into(),
        country: "US".into(),
    };

    let err = client(&format!("http://127.0.0.1:{port}/street-address"))
        .verify(&input)
        .unwrap_err();
    assert!(err.is_transient(), "{err:?}");
}

#[test]
fn missing_credentials_is_configuration_error() {
    let client = VerificationClient::new(
        ClientConfig::default().with_endpoint("http://127.0.0.1:9/street-address"),
    );
    let mut record = valid_record();

    assert!(matches!(
        record.deliverable_address(&client),
        Err(RecordError::Verify(VerifyError::Configuration(_)))
    ));
}

#[test]
fn batch_round_trip_through_files() {
    let (endpoint, server) = serve_once("200 OK", SAMPLE);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("addresses.json");
    std::fs::write(
        &path,
        r#"[
            {"firstname": "John", "lastname": "Doe", "phone": "555-123-4567",
             "address1": "45 Main Street", "address2": "Suite 850",
             "city": "Brooklyn", "state": "NY", "zipcode": "11201", "country": "US"},
            {"firstname": "Jane", "lastname": "Doe", "phone": "555-000-0000",
             "address1": "Prinzessinnenstr. 20", "city": "Berlin",
             "zipcode": "10969", "country": "DE"}
        ]"#,
    )
    .unwrap();

    let records = batch::load(&path).unwrap();
    assert_eq!(records.len(), 2);

    let report = batch::run(records, &client(&endpoint)).unwrap();
    assert!(report.iter().all(|x| x.valid));
    assert_eq!(report[0].record.address1, "45 Main St");
    assert_eq!(report[1].record.address1, "Prinzessinnenstr. 20");
    server.join().unwrap();
}
