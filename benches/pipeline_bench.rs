// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use url::Url;

use mustekala::{
    classify, set_header, CanonicalRequest, ClassifyDetails, ContentTypeCode, CorrelationState,
    Decision, HeaderEntry, InterceptionPipeline, NetworkChannel, PipelineConfig, RequestDetails,
    RequestRegistry, StageListener,
};

struct BenchChannel {
    url: Url,
    request_headers: Vec<HeaderEntry>,
    response_headers: Vec<HeaderEntry>,
    correlation: Option<CorrelationState>,
    aborted: bool,
}

impl BenchChannel {
    fn new(url: &str) -> Self {
        Self {
            url: Url::parse(url).unwrap(),
            request_headers: Vec::new(),
            response_headers: Vec::new(),
            correlation: None,
            aborted: false,
        }
    }
}

impl NetworkChannel for BenchChannel {
    fn url(&self) -> &Url {
        &self.url
    }

    fn abort(&mut self) {
        self.aborted = true;
    }

    fn redirect(&mut self, _target: &Url) {}

    fn request_headers(&self) -> Vec<HeaderEntry> {
        self.request_headers.clone()
    }

    fn response_headers(&self) -> Vec<HeaderEntry> {
        self.response_headers.clone()
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        set_header(&mut self.request_headers, name, value);
    }

    fn set_response_header(&mut self, name: &str, value: &str) {
        set_header(&mut self.response_headers, name, value);
    }

    fn correlation(&self) -> Option<CorrelationState> {
        self.correlation.clone()
    }

    fn attach_correlation(&mut self, state: CorrelationState) {
        self.correlation = Some(state);
    }
}

struct PassThrough;

impl StageListener for PassThrough {
    fn on_request(&self, request: &CanonicalRequest) -> mustekala::Result<Option<Decision>> {
        black_box(request.url.as_str());
        Ok(None)
    }
}

fn classify_benchmark(c: &mut Criterion) {
    let paths = [
        "/app/main.js",
        "/styles/site.css",
        "/media/clip.webm",
        "/img/logo.png",
        "/api/v1/items",
    ];

    c.bench_function("classify_fallback", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(classify(ContentTypeCode::OTHER, path));
            }
        })
    });
}

fn registry_benchmark(c: &mut Criterion) {
    let registry = RequestRegistry::new(256);
    let urls: Vec<String> = (0..512)
        .map(|i| format!("https://example.com/resource/{}.js", i))
        .collect();

    c.bench_function("registry_put_pop", |b| {
        b.iter(|| {
            for url in &urls {
                registry.put(url.clone(), RequestDetails::synthesized());
            }
            for url in &urls {
                black_box(registry.pop(url));
            }
        })
    });
}

fn headers_phase_benchmark(c: &mut Criterion) {
    let pipeline = InterceptionPipeline::new(PipelineConfig::default());
    pipeline.before_request().add(PassThrough);
    pipeline.before_send_headers().add(PassThrough);

    c.bench_function("headers_phase", |b| {
        b.iter(|| {
            pipeline.on_classify(
                ClassifyDetails::new("https://example.com/app.js", ContentTypeCode::SCRIPT).tab(1),
            );
            let mut channel = BenchChannel::new("https://example.com/app.js");
            pipeline.on_headers_phase(&mut channel);
            black_box(channel.aborted);
        })
    });
}

criterion_group!(
    benches,
    classify_benchmark,
    registry_benchmark,
    headers_phase_benchmark
);
criterion_main!(benches);
