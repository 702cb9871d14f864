//! Full runs through a scripted transport

use crate::support::*;
use review_collector::collector::{FieldError, StructureError};
use review_collector::{Collector, CollectorError, CollectorOptions, ConfigError, PageError, SourceError};
use review_collector::markup::{DecodeError, Decoder, Element, XmlDecoder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn options() -> CollectorOptions {
    CollectorOptions::default().delay_ms(0)
}

fn s(source: &str, page: u32) -> (String, u32) {
    (source.to_string(), page)
}

#[tokio::test]
async fn test_no_sources_completes_immediately() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(1, 0)));
    let mut collector =
        Collector::with_transport(Vec::<String>::new(), options(), transport).unwrap();
    let log = record_events(&mut collector);

    let summary = collector.collect().await;

    assert!(fetched(&requests).is_empty());
    assert_eq!(*log.lock().unwrap(), vec!["all done"]);
    assert!(summary.sources.is_empty());
}

#[tokio::test]
async fn test_second_page_empty_ends_source() {
    let (transport, requests) = ScriptedTransport::new(|request, _| match request.page {
        0 => Ok(page_xml(20, 0)),
        _ => Ok(page_xml(0, 0)),
    });
    let mut collector =
        Collector::with_transport("585027354", options().max_pages(2), transport).unwrap();
    let log = record_events(&mut collector);

    let summary = collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("585027354", 0), s("585027354", 1)]);
    assert_eq!(count_records(&log), 20);
    assert_eq!(
        milestones(&log),
        vec![
            "page 585027354 0 20",
            "page 585027354 1 0",
            "done 585027354 1 0 ok",
            "all done",
        ]
    );
    assert_eq!(summary.total_reviews(), 20);
    assert_eq!(summary.sources[0].pages_fetched, 2);
}

#[tokio::test]
async fn test_records_precede_their_page_event() {
    let (transport, _) = ScriptedTransport::new(|_, _| Ok(page_xml(2, 7)));
    let mut collector =
        Collector::with_transport("app", options().max_pages(1), transport).unwrap();
    let log = record_events(&mut collector);

    collector.collect().await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "record app 0 7",
            "record app 0 8",
            "page app 0 2",
            "done app 0 0 ok",
            "all done",
        ]
    );
}

#[tokio::test]
async fn test_page_cap_is_never_exceeded() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(3, 0)));
    let mut collector =
        Collector::with_transport("app", options().max_pages(2), transport).unwrap();
    let log = record_events(&mut collector);

    collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0), s("app", 1)]);
    assert_eq!(count_records(&log), 6);
    assert_eq!(milestones(&log)[2], "done app 1 0 ok");
}

#[tokio::test]
async fn test_single_page_cap_fetches_page_zero_only() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(5, 0)));
    let collector = Collector::with_transport("app", options().max_pages(1), transport).unwrap();

    collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0)]);
}

#[tokio::test]
async fn test_unbounded_pages_run_until_empty() {
    let (transport, requests) = ScriptedTransport::new(|request, _| {
        if request.page < 4 {
            Ok(page_xml(2, 0))
        } else {
            Ok(page_xml(0, 0))
        }
    });
    let collector = Collector::with_transport("app", options().max_pages(0), transport).unwrap();

    let summary = collector.collect().await;

    assert_eq!(fetched(&requests).len(), 5);
    assert_eq!(summary.sources[0].last_page, 4);
    assert_eq!(summary.total_reviews(), 8);
}

#[tokio::test]
async fn test_transport_failures_exhaust_retries() {
    let (transport, requests) = ScriptedTransport::new(|request, _| Err(network_error(request)));
    let mut collector =
        Collector::with_transport("app", options().max_retries(3), transport).unwrap();
    let log = record_events(&mut collector);

    let errors = Arc::new(Mutex::new(Vec::new()));
    {
        let errors = errors.clone();
        collector.on_source_done(move |e| {
            if let Some(SourceError::RetriesExhausted { last_error, .. }) = &e.error {
                errors
                    .lock()
                    .unwrap()
                    .push(matches!(last_error, PageError::Transport(_)));
            }
        });
    }

    let summary = collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0), s("app", 0), s("app", 0)]);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["done app 0 0 exhausted@0x3", "all done"]
    );
    assert_eq!(*errors.lock().unwrap(), vec![true]);
    assert_eq!(summary.failed_sources().count(), 1);
}

#[tokio::test]
async fn test_failed_source_does_not_stop_the_run() {
    let (transport, requests) = ScriptedTransport::new(|request, _| {
        match (request.source_id.as_str(), request.page) {
            ("broken", _) => Err(network_error(request)),
            (_, 0) => Ok(page_xml(4, 0)),
            _ => Ok(page_xml(0, 0)),
        }
    });
    let mut collector = Collector::with_transport(
        vec!["broken", "healthy"],
        options().max_retries(2),
        transport,
    )
    .unwrap();
    let log = record_events(&mut collector);

    collector.collect().await;

    assert_eq!(
        fetched(&requests),
        vec![
            s("broken", 0),
            s("broken", 0),
            s("healthy", 0),
            s("healthy", 1)
        ]
    );
    assert_eq!(
        milestones(&log),
        vec![
            "done broken 0 1 exhausted@0x2",
            "page healthy 0 4",
            "page healthy 1 0",
            "done healthy 1 0 ok",
            "all done",
        ]
    );
}

#[tokio::test]
async fn test_retry_refetches_same_page_and_resets_budget() {
    // Page 0 fails once, page 1 fails twice; with three attempts per page both recover
    let (transport, requests) = ScriptedTransport::new(|request, attempt| {
        match (request.page, attempt) {
            (0, 0) => Ok("<Document><View>".to_string()),
            (1, 0) => Err(network_error(request)),
            (1, 1) => Ok(error_page()),
            (2, _) => Ok(page_xml(0, 0)),
            _ => Ok(page_xml(1, request.page as usize)),
        }
    });
    let mut collector =
        Collector::with_transport("app", options().max_pages(0).max_retries(3), transport)
            .unwrap();
    let log = record_events(&mut collector);

    collector.collect().await;

    assert_eq!(
        fetched(&requests),
        vec![
            s("app", 0),
            s("app", 0),
            s("app", 1),
            s("app", 1),
            s("app", 1),
            s("app", 2)
        ]
    );
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "record app 0 0",
            "page app 0 1",
            "record app 1 1",
            "page app 1 1",
            "page app 2 0",
            "done app 2 0 ok",
            "all done",
        ]
    );
}

#[tokio::test]
async fn test_delay_precedes_every_fetch_including_retries() {
    let delay = Duration::from_millis(60);
    let started = Instant::now();
    let stamps = Arc::new(Mutex::new(Vec::new()));
    let seen = stamps.clone();
    let (transport, requests) = ScriptedTransport::new(move |request, attempt| {
        seen.lock().unwrap().push(Instant::now());
        match (request.page, attempt) {
            (0, 0) => Err(network_error(request)),
            (0, _) => Ok(page_xml(2, 0)),
            _ => Ok(page_xml(0, 0)),
        }
    });
    let options = CollectorOptions::default()
        .delay_ms(delay.as_millis() as u64)
        .max_pages(0);
    let collector = Collector::with_transport("app", options, transport).unwrap();

    collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0), s("app", 0), s("app", 1)]);

    let stamps = stamps.lock().unwrap();
    assert!(stamps[0] - started >= delay, "first fetch was not delayed");
    for pair in stamps.windows(2) {
        assert!(pair[1] - pair[0] >= delay, "fetches closer than the delay");
    }
}

#[tokio::test]
async fn test_error_page_consumes_retry_budget() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(error_page()));
    let mut collector =
        Collector::with_transport("gone", options().max_retries(2), transport).unwrap();

    let structural = Arc::new(Mutex::new(false));
    {
        let structural = structural.clone();
        collector.on_source_done(move |e| {
            *structural.lock().unwrap() = matches!(
                &e.error,
                Some(SourceError::RetriesExhausted {
                    last_error: PageError::Structure(StructureError::MissingReviewList(_)),
                    ..
                })
            );
        });
    }

    collector.collect().await;

    assert_eq!(fetched(&requests).len(), 2);
    assert!(*structural.lock().unwrap());
}

#[tokio::test]
async fn test_malformed_review_fails_page_by_default() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_with_malformed_review()));
    let mut collector =
        Collector::with_transport("app", options().max_retries(2), transport).unwrap();
    let log = record_events(&mut collector);

    let malformed_index = Arc::new(Mutex::new(None));
    {
        let malformed_index = malformed_index.clone();
        collector.on_source_done(move |e| {
            if let Some(SourceError::RetriesExhausted {
                last_error:
                    PageError::Structure(StructureError::MalformedReview {
                        index,
                        reason: FieldError::MissingReviewId(_),
                    }),
                ..
            }) = &e.error
            {
                *malformed_index.lock().unwrap() = Some(*index);
            }
        });
    }

    collector.collect().await;

    assert_eq!(fetched(&requests).len(), 2);
    assert_eq!(count_records(&log), 0);
    assert_eq!(*malformed_index.lock().unwrap(), Some(1));
}

#[tokio::test]
async fn test_malformed_review_skipped_when_enabled() {
    let (transport, _) = ScriptedTransport::new(|_, _| Ok(page_with_malformed_review()));
    let mut collector = Collector::with_transport(
        "app",
        options().max_pages(1).skip_malformed(true),
        transport,
    )
    .unwrap();
    let log = record_events(&mut collector);

    collector.collect().await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "record app 0 1",
            "record app 0 3",
            "page app 0 2",
            "done app 0 0 ok",
            "all done",
        ]
    );
}

#[tokio::test]
async fn test_caller_decides_each_page() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(2, 0)));
    let mut collector =
        Collector::with_transport("app", options().caller_driven(true), transport).unwrap();
    let log = record_events(&mut collector);

    collector.on_page_complete(|e| {
        assert!(e.decision.is_some());
        if e.page < 2 {
            assert!(e.proceed());
        } else {
            assert!(e.stop());
        }
    });

    collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0), s("app", 1), s("app", 2)]);
    assert_eq!(milestones(&log).last().map(String::as_str), Some("all done"));
    assert!(milestones(&log).contains(&"done app 2 0 ok".to_string()));
}

#[tokio::test]
async fn test_second_decision_is_ignored() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(2, 0)));
    let mut collector =
        Collector::with_transport("app", options().caller_driven(true), transport).unwrap();

    let outcomes = Arc::new(Mutex::new(Vec::new()));
    {
        let outcomes = outcomes.clone();
        collector.on_page_complete(move |e| {
            let stopped = e.stop();
            let continued = e.proceed();
            outcomes.lock().unwrap().push((stopped, continued));
        });
    }

    collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0)]);
    assert_eq!(*outcomes.lock().unwrap(), vec![(true, false)]);
}

#[tokio::test]
async fn test_continue_on_empty_page_stops() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(0, 0)));
    let mut collector =
        Collector::with_transport("app", options().caller_driven(true), transport).unwrap();
    let log = record_events(&mut collector);
    collector.on_page_complete(|e| {
        e.proceed();
    });

    collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0)]);
    assert_eq!(
        milestones(&log),
        vec!["page app 0 0", "done app 0 0 ok", "all done"]
    );
}

#[tokio::test]
async fn test_caller_driven_overrides_page_cap() {
    let (transport, requests) = ScriptedTransport::new(|request, _| {
        if request.page < 3 {
            Ok(page_xml(1, 0))
        } else {
            Ok(page_xml(0, 0))
        }
    });
    let mut collector = Collector::with_transport(
        "app",
        options().max_pages(1).caller_driven(true),
        transport,
    )
    .unwrap();
    collector.on_page_complete(|e| {
        e.proceed();
    });

    collector.collect().await;

    assert_eq!(fetched(&requests).len(), 4);
}

#[tokio::test]
async fn test_decision_from_another_task() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(1, 0)));
    let mut collector =
        Collector::with_transport("app", options().caller_driven(true), transport).unwrap();

    collector.on_page_complete(|e| {
        let decision = e.decision.clone().expect("caller-driven page carries a decision");
        let page = e.page;
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            if page == 0 {
                decision.proceed();
            } else {
                decision.stop();
            }
        });
    });

    let summary = collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0), s("app", 1)]);
    assert_eq!(summary.sources[0].last_page, 1);
}

#[tokio::test]
async fn test_undecided_page_stops_when_no_handle_survives() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(1, 0)));
    let mut collector =
        Collector::with_transport("app", options().caller_driven(true), transport).unwrap();
    let log = record_events(&mut collector);

    collector.collect().await;

    assert_eq!(fetched(&requests), vec![s("app", 0)]);
    assert_eq!(
        milestones(&log),
        vec!["page app 0 1", "done app 0 0 ok", "all done"]
    );
}

#[tokio::test]
async fn test_fixed_cap_pages_carry_no_decision() {
    let (transport, _) = ScriptedTransport::new(|_, _| Ok(page_xml(1, 0)));
    let mut collector =
        Collector::with_transport("app", options().max_pages(1), transport).unwrap();

    let decisions = Arc::new(Mutex::new(Vec::new()));
    {
        let decisions = decisions.clone();
        collector.on_page_complete(move |e| decisions.lock().unwrap().push(e.decision.is_some()));
    }

    collector.collect().await;

    assert_eq!(*decisions.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn test_requests_carry_configured_headers() {
    let (transport, requests) = ScriptedTransport::new(|_, _| Ok(page_xml(0, 0)));
    let collector = Collector::with_transport(
        "585027354",
        options().user_agent("TestAgent/2.0"),
        transport,
    )
    .unwrap();

    collector.collect().await;

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.header("User-Agent"), Some("TestAgent/2.0"));
    assert_eq!(request.header("X-Apple-Store-Front"), Some("143441-1,29"));
    assert!(request.header("X-Apple-Tz").is_some());
    assert!(request.url.as_str().contains("id=585027354"));
    assert!(request.url.as_str().contains("pageNumber=0"));
}

#[test]
fn test_invalid_sources_rejected_at_construction() {
    let (transport, _) = ScriptedTransport::new(|_, _| Ok(page_xml(0, 0)));
    let result = Collector::with_transport("", options(), transport);
    assert!(matches!(
        result,
        Err(CollectorError::Config(ConfigError::InvalidSource(_)))
    ));

    let (transport, _) = ScriptedTransport::new(|_, _| Ok(page_xml(0, 0)));
    let result = Collector::with_transport(vec!["a", "b", "a"], options(), transport);
    assert!(matches!(
        result,
        Err(CollectorError::Config(ConfigError::DuplicateSource(_)))
    ));
}

#[test]
fn test_invalid_options_rejected_at_construction() {
    let (transport, _) = ScriptedTransport::new(|_, _| Ok(page_xml(0, 0)));
    let result = Collector::with_transport("app", options().max_retries(0), transport);
    assert!(matches!(
        result,
        Err(CollectorError::Config(ConfigError::Validation(_)))
    ));
}

struct CountingDecoder {
    calls: Arc<AtomicUsize>,
}

impl Decoder for CountingDecoder {
    fn decode(&self, payload: &str) -> Result<Element, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        XmlDecoder.decode(payload)
    }
}

#[tokio::test]
async fn test_custom_decoder_handles_every_page() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (transport, _) = ScriptedTransport::new(|request, _| match request.page {
        0 => Ok(page_xml(3, 0)),
        _ => Ok(page_xml(0, 0)),
    });
    let collector = Collector::with_transport(["a", "b"], options().max_pages(0), transport)
        .unwrap()
        .with_decoder(CountingDecoder {
            calls: calls.clone(),
        });

    assert_eq!(collector.sources().iter().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(collector.config().max_pages, 0);
    assert!(collector.config().delay.is_zero());

    let summary = collector.collect().await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(summary.total_reviews(), 6);
}
