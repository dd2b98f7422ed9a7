//! End-to-end flow execution tests with fake provider adapters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use flowrun::{
    EmbeddingModel, ErrorCode, ExecutionResult, FlowError, FlowExecutor, FlowHooks, HookSignal,
    HostConfig, LanguageModel, LlmReply, LlmRequest, NodeError, NodeEvent, ProviderError,
    ProviderRegistry, VectorDeletion, VectorIndex, VectorMatch, VectorQuery, VectorRecord,
};

// ---- fake providers -------------------------------------------------------

struct CannedLlm {
    reply: String,
}

#[async_trait]
impl LanguageModel for CannedLlm {
    async fn generate(&self, _request: LlmRequest) -> Result<LlmReply, ProviderError> {
        Ok(LlmReply {
            text: self.reply.clone(),
            usage: None,
        })
    }
}

struct HashEmbedding;

#[async_trait]
impl EmbeddingModel for HashEmbedding {
    async fn embed(
        &self,
        _model: &str,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts
            .iter()
            .map(|t| vec![t.len() as f32, 1.0, 0.5])
            .collect())
    }
}

#[derive(Default)]
struct MemoryVectorStore {
    records: Mutex<Vec<VectorRecord>>,
}

#[async_trait]
impl VectorIndex for MemoryVectorStore {
    async fn insert(
        &self,
        _index_name: &str,
        _namespace: Option<&str>,
        records: Vec<VectorRecord>,
    ) -> Result<usize, ProviderError> {
        let count = records.len();
        self.records.lock().extend(records);
        Ok(count)
    }

    async fn search(&self, query: VectorQuery) -> Result<Vec<VectorMatch>, ProviderError> {
        let records = self.records.lock();
        let top_k = query.top_k.unwrap_or(records.len());
        Ok(records
            .iter()
            .take(top_k)
            .map(|r| VectorMatch {
                id: r.id.clone(),
                score: 0.9,
                metadata: r.metadata.clone(),
            })
            .collect())
    }

    async fn update(
        &self,
        _index_name: &str,
        _namespace: Option<&str>,
        record: VectorRecord,
    ) -> Result<(), ProviderError> {
        let mut records = self.records.lock();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(ProviderError::Request(format!("no record {}", record.id))),
        }
    }

    async fn delete(&self, deletion: VectorDeletion) -> Result<usize, ProviderError> {
        let mut records = self.records.lock();
        let before = records.len();
        if deletion.delete_all {
            records.clear();
        } else {
            records.retain(|r| !deletion.ids.contains(&r.id));
        }
        Ok(before - records.len())
    }
}

fn executor_with(providers: ProviderRegistry, limit: usize) -> FlowExecutor {
    FlowExecutor::new(HostConfig::with_global_limit(limit), providers).unwrap()
}

fn executor() -> FlowExecutor {
    executor_with(ProviderRegistry::new(), 2)
}

async fn run(executor: &FlowExecutor, flow: Value, inputs: Value) -> ExecutionResult {
    let inputs: HashMap<String, Value> = serde_json::from_value(inputs).unwrap();
    executor.run(flow, inputs).await.unwrap()
}

// ---- control-flow scenarios ----------------------------------------------

fn scoring_flow() -> Value {
    json!({
        "name": "scoring",
        "version": "1.0.0",
        "description": "grades a score",
        "author": "tests",
        "variables": [
            {"id": "user_score", "type": "number"},
            {"id": "grade_label", "type": "string", "default": ""}
        ],
        "input": ["user_score"],
        "output": ["grade_label"],
        "nodes": [{
            "id": "grade",
            "type": "CONDITION",
            "name": "Grade",
            "input": {"switch_value": "{{user_score}}"},
            "branches": {
                "excellent": {
                    "condition": "greater_than", "value": 90,
                    "nodes": [{
                        "id": "set_excellent", "type": "UPDATE_VARIABLE", "name": "set",
                        "config": {"variable_id": "grade_label", "type": "update"},
                        "value": "Excellent"
                    }]
                },
                "good": {
                    "condition": "greater_than", "value": 70,
                    "nodes": [{
                        "id": "set_good", "type": "UPDATE_VARIABLE", "name": "set",
                        "config": {"variable_id": "grade_label", "type": "update"},
                        "value": "Good"
                    }]
                },
                "default": {
                    "nodes": [{
                        "id": "set_default", "type": "UPDATE_VARIABLE", "name": "set",
                        "config": {"variable_id": "grade_label", "type": "update"},
                        "value": "Try harder"
                    }]
                }
            }
        }]
    })
}

#[tokio::test]
async fn conditional_scoring() {
    let exec = executor();
    let result = run(&exec, scoring_flow(), json!({"user_score": 95})).await;
    assert!(result.success);
    assert_eq!(result.outputs["grade_label"], json!("Excellent"));

    let result = run(&exec, scoring_flow(), json!({"user_score": 75})).await;
    assert_eq!(result.outputs["grade_label"], json!("Good"));

    let result = run(&exec, scoring_flow(), json!({"user_score": 30})).await;
    assert_eq!(result.outputs["grade_label"], json!("Try harder"));
}

#[tokio::test]
async fn for_each_summation() {
    let flow = json!({
        "name": "summation",
        "version": "1.0.0",
        "variables": [
            {"id": "items", "type": "array"},
            {"id": "out", "type": "string", "default": ""}
        ],
        "input": ["items"],
        "output": ["out"],
        "nodes": [{
            "id": "loop",
            "type": "FOR_EACH",
            "name": "Loop",
            "config": {"each_key": "current"},
            "input": {"items": "{{items}}"},
            "each_nodes": [{
                "id": "acc", "type": "UPDATE_VARIABLE", "name": "acc",
                "config": {"variable_id": "out", "type": "join", "join_str": ","},
                "value": "N={{current}}"
            }]
        }]
    });
    let result = run(&executor(), flow, json!({"items": [1, 2, 3, 4, 5]})).await;
    assert_eq!(result.outputs["out"], json!("N=1,N=2,N=3,N=4,N=5"));
}

#[tokio::test]
async fn append_monotonicity() {
    let flow = json!({
        "name": "append",
        "version": "1.0.0",
        "variables": [
            {"id": "items", "type": "array"},
            {"id": "collected", "type": "array", "default": []}
        ],
        "input": ["items"],
        "output": ["collected"],
        "nodes": [{
            "id": "loop",
            "type": "FOR_EACH",
            "name": "Loop",
            "config": {"each_key": "entry"},
            "input": {"items": "{{items}}"},
            "each_nodes": [{
                "id": "push", "type": "UPDATE_VARIABLE", "name": "push",
                "config": {"variable_id": "collected", "type": "append", "stringify_output": false},
                "value": "{{entry}}"
            }]
        }]
    });
    let items = json!(["a", "b", "c", "d", "e", "f", "g"]);
    let result = run(&executor(), flow, json!({"items": items.clone()})).await;
    // the target grows by exactly one element per iteration
    assert_eq!(result.outputs["collected"], items);
}

#[tokio::test]
async fn pick_with_dotted_paths() {
    let flow = json!({
        "name": "pick",
        "version": "1.0.0",
        "variables": [
            {"id": "records", "type": "array"},
            {"id": "picked", "type": "array"}
        ],
        "input": ["records"],
        "output": ["picked"],
        "nodes": [{
            "id": "project", "type": "UPDATE_VARIABLE", "name": "project",
            "config": {"variable_id": "picked", "type": "pick", "fields": ["metadata.text"]},
            "value": "{{records}}"
        }]
    });
    let result = run(
        &executor(),
        flow,
        json!({"records": [
            {"id": "a", "metadata": {"text": "x"}},
            {"id": "b", "metadata": {"text": "y"}}
        ]}),
    )
    .await;
    assert_eq!(result.outputs["picked"], json!([{"text": "x"}, {"text": "y"}]));
}

#[tokio::test]
async fn cycle_is_rejected() {
    let flow = json!({
        "name": "cyclic",
        "version": "1.0.0",
        "variables": [{"id": "x"}, {"id": "y"}],
        "nodes": [
            {
                "id": "a", "type": "UPDATE_VARIABLE", "name": "a",
                "config": {"variable_id": "x", "type": "update"},
                "value": "{{b.output}}"
            },
            {
                "id": "b", "type": "UPDATE_VARIABLE", "name": "b",
                "config": {"variable_id": "y", "type": "update"},
                "value": "{{a.output}}"
            }
        ]
    });
    let err = executor().run(flow, HashMap::new()).await.unwrap_err();
    match err {
        FlowError::ValidationFailed(report) => {
            assert!(report.has_error(ErrorCode::CircularDependency));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[tokio::test]
async fn forward_reference_is_reordered() {
    let flow = json!({
        "name": "forward",
        "version": "1.0.0",
        "variables": [{"id": "x", "type": "string"}, {"id": "y", "type": "string"}],
        "output": ["x"],
        "nodes": [
            {
                "id": "consumer", "type": "UPDATE_VARIABLE", "name": "consumer",
                "config": {"variable_id": "x", "type": "update"},
                "value": "{{producer.output.new_value}}"
            },
            {
                "id": "producer", "type": "UPDATE_VARIABLE", "name": "producer",
                "config": {"variable_id": "y", "type": "update"},
                "value": "hello"
            }
        ]
    });
    let result = run(&executor(), flow, json!({})).await;
    // the dependency edge forced the producer to run first
    assert_eq!(result.outputs["x"], json!("hello"));
}

#[tokio::test]
async fn type_enforcement_on_inputs() {
    let flow = json!({
        "name": "typed",
        "version": "1.0.0",
        "variables": [{"id": "n", "type": "number"}],
        "input": ["n"],
        "nodes": []
    });
    let mut inputs = HashMap::new();
    inputs.insert("n".to_string(), json!("42"));
    let err = executor().run(flow, inputs).await.unwrap_err();
    match err {
        FlowError::InvalidInput { variable_id, error } => {
            assert_eq!(variable_id, "n");
            assert!(matches!(error, NodeError::TypeError(_)));
        }
        other => panic!("expected InvalidInput, got {:?}", other),
    }
}

#[tokio::test]
async fn output_completeness() {
    let flow = json!({
        "name": "outputs",
        "version": "1.0.0",
        "variables": [
            {"id": "a", "type": "string", "default": "seed"},
            {"id": "b"}
        ],
        "output": ["a", "b"],
        "nodes": [{
            "id": "set_b", "type": "UPDATE_VARIABLE", "name": "set",
            "config": {"variable_id": "b", "type": "update"},
            "value": "{{a}}"
        }]
    });
    let result = run(&executor(), flow, json!({})).await;
    assert_eq!(result.outputs.len(), 2);
    assert_eq!(result.outputs["a"], json!("seed"));
    assert_eq!(result.outputs["b"], json!("seed"));
}

// ---- hooks -----------------------------------------------------------------

struct StopAfterFirst;

#[async_trait]
impl FlowHooks for StopAfterFirst {
    async fn after_node(&self, _event: &NodeEvent, _output: &Value) -> Result<HookSignal, String> {
        Ok(HookSignal::Stop)
    }
}

#[tokio::test]
async fn after_node_stop_short_circuits() {
    let flow = json!({
        "name": "stop",
        "version": "1.0.0",
        "variables": [{"id": "first"}, {"id": "second", "default": "untouched"}],
        "output": ["first", "second"],
        "nodes": [
            {
                "id": "n1", "type": "UPDATE_VARIABLE", "name": "n1",
                "config": {"variable_id": "first", "type": "update"},
                "value": "done"
            },
            {
                "id": "n2", "type": "UPDATE_VARIABLE", "name": "n2",
                "config": {"variable_id": "second", "type": "update"},
                "value": "overwritten"
            }
        ]
    });
    let result = executor()
        .run_with_hooks(flow, HashMap::new(), Arc::new(StopAfterFirst))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.outputs["first"], json!("done"));
    assert_eq!(result.outputs["second"], json!("untouched"));
}

struct ContinueOnError;

#[async_trait]
impl FlowHooks for ContinueOnError {
    async fn on_error(&self, _event: &NodeEvent, _error: &NodeError) -> Result<HookSignal, String> {
        Ok(HookSignal::Continue)
    }
}

#[tokio::test]
async fn skipped_node_leaves_template_literal() {
    // the LLM provider is not registered, so the node fails; on_error says
    // continue, and later template references stay literal
    let flow = json!({
        "name": "skip",
        "version": "1.0.0",
        "variables": [{"id": "summary", "type": "string"}],
        "output": ["summary"],
        "nodes": [
            {
                "id": "gen", "type": "LLM", "name": "gen",
                "config": {"provider": "openai", "model": "gpt-4o"},
                "messages": [{"role": "user", "text": "summarize"}],
                "output": {"answer": {"type": "string"}}
            },
            {
                "id": "render", "type": "UPDATE_VARIABLE", "name": "render",
                "config": {"variable_id": "summary", "type": "update"},
                "value": "result: {{gen.output.answer}}"
            }
        ]
    });
    let result = executor()
        .run_with_hooks(flow, HashMap::new(), Arc::new(ContinueOnError))
        .await
        .unwrap();
    assert_eq!(
        result.outputs["summary"],
        json!("result: {{gen.output.answer}}")
    );
}

struct FailingHooks;

#[async_trait]
impl FlowHooks for FailingHooks {
    async fn before_node(&self, _event: &NodeEvent) -> Result<(), String> {
        Err("before failed".into())
    }

    async fn after_node(&self, _event: &NodeEvent, _output: &Value) -> Result<HookSignal, String> {
        Err("after failed".into())
    }

    async fn on_complete(
        &self,
        _flow_id: &str,
        _outputs: &HashMap<String, Value>,
    ) -> Result<(), String> {
        Err("complete failed".into())
    }
}

#[tokio::test]
async fn hook_failures_do_not_disturb_the_flow() {
    let flow = json!({
        "name": "hooks",
        "version": "1.0.0",
        "variables": [{"id": "v"}],
        "output": ["v"],
        "nodes": [{
            "id": "n1", "type": "UPDATE_VARIABLE", "name": "n1",
            "config": {"variable_id": "v", "type": "update"},
            "value": "ok"
        }]
    });
    let result = executor()
        .run_with_hooks(flow, HashMap::new(), Arc::new(FailingHooks))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.outputs["v"], json!("ok"));
}

#[tokio::test]
async fn node_failure_stops_flow_by_default() {
    let flow = json!({
        "name": "fail",
        "version": "1.0.0",
        "variables": [{"id": "v"}],
        "nodes": [{
            "id": "gen", "type": "LLM", "name": "gen",
            "config": {"provider": "ghost", "model": "m"},
            "messages": [{"role": "user", "text": "hi"}],
            "output": {"answer": {"type": "string"}}
        }]
    });
    let err = executor().run(flow, HashMap::new()).await.unwrap_err();
    match err {
        FlowError::NodeExecutionError { node_id, error } => {
            assert_eq!(node_id, "gen");
            assert!(matches!(error, NodeError::ProviderNotConfigured(_)));
        }
        other => panic!("expected node execution error, got {:?}", other),
    }
}

// ---- provider-backed nodes -------------------------------------------------

#[tokio::test]
async fn llm_structured_output() {
    let mut providers = ProviderRegistry::new();
    providers.register_llm(
        "fake",
        Arc::new(CannedLlm {
            reply: r#"{"answer": "Excellent work", "confidence": 0.97}"#.into(),
        }),
    );
    let exec = executor_with(providers, 2);

    let flow = json!({
        "name": "llm",
        "version": "1.0.0",
        "variables": [{"id": "text", "type": "string"}],
        "output": ["text"],
        "nodes": [
            {
                "id": "gen", "type": "LLM", "name": "gen",
                "config": {"provider": "fake", "model": "any", "temperature": 0.2},
                "messages": [{"role": "user", "text": "grade this"}],
                "output": {
                    "answer": {"type": "string", "description": "the grade"},
                    "confidence": {"type": "number"}
                }
            },
            {
                "id": "copy", "type": "UPDATE_VARIABLE", "name": "copy",
                "config": {"variable_id": "text", "type": "update"},
                "value": "{{gen.output.answer}}"
            }
        ]
    });
    let result = run(&exec, flow, json!({})).await;
    assert_eq!(result.outputs["text"], json!("Excellent work"));
}

#[tokio::test]
async fn llm_schema_violation_fails() {
    let mut providers = ProviderRegistry::new();
    providers.register_llm(
        "fake",
        Arc::new(CannedLlm {
            reply: "certainly! here is my answer".into(),
        }),
    );
    let exec = executor_with(providers, 2);

    let flow = json!({
        "name": "llm-bad",
        "version": "1.0.0",
        "nodes": [{
            "id": "gen", "type": "LLM", "name": "gen",
            "config": {"provider": "fake", "model": "any"},
            "messages": [{"role": "user", "text": "hi"}],
            "output": {"answer": {"type": "string"}}
        }]
    });
    let err = exec.run(flow, HashMap::new()).await.unwrap_err();
    match err {
        FlowError::NodeExecutionError { error, .. } => {
            assert!(matches!(error, NodeError::SchemaViolation(_)));
        }
        other => panic!("expected schema violation, got {:?}", other),
    }
}

#[tokio::test]
async fn embedding_and_vector_round_trip() {
    let mut providers = ProviderRegistry::new();
    providers.register_embedding("fake-embed", Arc::new(HashEmbedding));
    providers.register_vector("fake-vec", Arc::new(MemoryVectorStore::default()));
    let exec = executor_with(providers, 2);

    let flow = json!({
        "name": "rag-ingest",
        "version": "1.0.0",
        "variables": [
            {"id": "docs", "type": "array"},
            {"id": "match_count", "type": "number"}
        ],
        "input": ["docs"],
        "output": ["match_count"],
        "nodes": [
            {
                "id": "embed", "type": "TEXT_EMBEDDING", "name": "embed",
                "config": {"provider": "fake-embed", "model": "small"},
                "input": {"texts": "{{docs}}"}
            },
            {
                "id": "store", "type": "VECTOR_INSERT", "name": "store",
                "config": {"provider": "fake-vec", "index_name": "docs"},
                "input": {"records": [
                    {"id": "d1", "text": "one"},
                    {"id": "d2", "text": "two"}
                ]}
            },
            {
                "id": "lookup", "type": "VECTOR_SEARCH", "name": "lookup",
                "config": {"provider": "fake-vec", "index_name": "docs", "top_k": 5},
                "input": {"query": "anything"}
            },
            {
                "id": "record", "type": "UPDATE_VARIABLE", "name": "record",
                "config": {"variable_id": "match_count", "type": "update"},
                "value": "{{lookup.output.count}}"
            }
        ]
    });
    let result = run(&exec, flow, json!({"docs": ["one", "two"]})).await;
    assert_eq!(result.outputs["match_count"], json!(2));
}

struct TwoPageRasterizer;

#[async_trait]
impl flowrun::PdfRasterizer for TwoPageRasterizer {
    async fn rasterize(
        &self,
        path: &std::path::Path,
        options: &flowrun::RasterOptions,
    ) -> Result<Vec<flowrun::PageImage>, ProviderError> {
        let dir = path.parent().ok_or_else(|| {
            ProviderError::Request("document has no parent directory".into())
        })?;
        let mut pages = Vec::new();
        for index in 0..2 {
            let page_path = dir.join(format!("page-{}.{}", index, options.format));
            std::fs::write(&page_path, b"image bytes")
                .map_err(|e| ProviderError::Request(e.to_string()))?;
            pages.push(flowrun::PageImage {
                path: page_path,
                width: 816,
                height: 1056,
            });
        }
        Ok(pages)
    }
}

#[tokio::test]
async fn document_splitter_registers_pages() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("report.pdf");
    std::fs::write(&doc_path, b"%PDF-1.7").unwrap();

    let mut providers = ProviderRegistry::new();
    providers.set_rasterizer(Arc::new(TwoPageRasterizer));
    let exec = executor_with(providers, 2);

    let flow = json!({
        "name": "split",
        "version": "1.0.0",
        "variables": [
            {"id": "doc", "type": "file"},
            {"id": "page_count", "type": "number"},
            {"id": "pages", "type": "array"}
        ],
        "input": ["doc"],
        "output": ["page_count", "pages"],
        "nodes": [
            {
                "id": "split", "type": "DOCUMENT_SPLITTER", "name": "split",
                "config": {"image_quality": "high", "dpi": 200, "image_format": "png"},
                "document": "{{doc}}"
            },
            {
                "id": "count", "type": "UPDATE_VARIABLE", "name": "count",
                "config": {"variable_id": "page_count", "type": "update"},
                "value": "{{split.output.total_pages}}"
            },
            {
                "id": "keep_pages", "type": "UPDATE_VARIABLE", "name": "keep pages",
                "config": {"variable_id": "pages", "type": "update"},
                "value": "{{split.output.pages}}"
            }
        ]
    });
    let result = run(
        &exec,
        flow,
        json!({"doc": doc_path.to_str().unwrap()}),
    )
    .await;
    assert_eq!(result.outputs["page_count"], json!(2));

    // every page image went through the file store
    let files = exec.files();
    for page in result.outputs["pages"].as_array().unwrap() {
        let id = page["file_id"].as_str().unwrap();
        assert!(files.has_file(id));
        assert!(files.is_image(id));
    }
}

// ---- concurrency and shutdown ----------------------------------------------

struct ConcurrencyProbe {
    current: AtomicUsize,
    max_seen: AtomicUsize,
}

#[async_trait]
impl FlowHooks for ConcurrencyProbe {
    async fn before_node(&self, _event: &NodeEvent) -> Result<(), String> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        Ok(())
    }

    async fn after_node(&self, _event: &NodeEvent, _output: &Value) -> Result<HookSignal, String> {
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(HookSignal::Continue)
    }
}

fn slow_flow() -> Value {
    json!({
        "name": "slow",
        "version": "1.0.0",
        "variables": [{"id": "out", "type": "string", "default": ""}],
        "output": ["out"],
        "nodes": [{
            "id": "loop", "type": "FOR_EACH", "name": "loop",
            "config": {"each_key": "i", "delay_between": 20},
            "input": {"items": [1, 2, 3]},
            "each_nodes": [{
                "id": "tick", "type": "UPDATE_VARIABLE", "name": "tick",
                "config": {"variable_id": "out", "type": "join", "join_str": "."},
                "value": "{{i}}"
            }]
        }]
    })
}

#[tokio::test]
async fn global_limit_bounds_parallel_flows() {
    let exec = Arc::new(executor_with(ProviderRegistry::new(), 2));
    let probe = Arc::new(ConcurrencyProbe {
        current: AtomicUsize::new(0),
        max_seen: AtomicUsize::new(0),
    });

    let mut handles = Vec::new();
    for _ in 0..4 {
        let exec = exec.clone();
        let probe = probe.clone();
        handles.push(tokio::spawn(async move {
            exec.run_with_hooks(slow_flow(), HashMap::new(), probe)
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.outputs["out"], json!("1.2.3"));
    }
    assert!(probe.max_seen.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn shutdown_rejects_new_flows() {
    let exec = Arc::new(executor_with(ProviderRegistry::new(), 1));

    let running = {
        let exec = exec.clone();
        tokio::spawn(async move { exec.run(slow_flow(), HashMap::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    exec.shutdown(Duration::from_secs(2)).await;

    let err = exec.run(slow_flow(), HashMap::new()).await.unwrap_err();
    assert!(matches!(err, FlowError::ShuttingDown));

    // the in-flight flow was allowed to finish
    let result = running.await.unwrap().unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn flow_ids_are_unique() {
    let exec = executor();
    let a = run(&exec, scoring_flow(), json!({"user_score": 95})).await;
    let b = run(&exec, scoring_flow(), json!({"user_score": 95})).await;
    assert_ne!(a.flow_id, b.flow_id);
    assert!(a.flow_id.starts_with("flow-"));
}
