use cachestat::counters::{CounterSource, MemoryCounters};
use cachestat::domain::{
    CounterReadError, CounterTable, EventClass, ReportError, Sample, SamplerError,
};
use cachestat::report::Reporter;
use cachestat::sampler::Sampler;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// Collects samples and fires `stop` once `limit` samples have been seen
struct StopAfter {
    samples: Arc<Mutex<Vec<Sample>>>,
    limit: usize,
    stop: Option<oneshot::Sender<()>>,
}

impl StopAfter {
    fn new(limit: usize) -> (Self, Arc<Mutex<Vec<Sample>>>, oneshot::Receiver<()>) {
        let samples = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = oneshot::channel();
        (Self { samples: Arc::clone(&samples), limit, stop: Some(tx) }, samples, rx)
    }
}

impl Reporter for StopAfter {
    fn report(&mut self, sample: &Sample) -> Result<(), ReportError> {
        let mut samples = self.samples.lock().unwrap();
        samples.push(*sample);
        if samples.len() >= self.limit {
            if let Some(stop) = self.stop.take() {
                let _ = stop.send(());
            }
        }
        Ok(())
    }
}

/// Replays a fixed sequence of counter tables
struct Scripted(Vec<CounterTable>);

impl CounterSource for Scripted {
    fn snapshot_and_clear(&mut self) -> Result<CounterTable, CounterReadError> {
        if self.0.is_empty() {
            Ok(CounterTable::default())
        } else {
            Ok(self.0.remove(0))
        }
    }
}

struct Broken;

impl CounterSource for Broken {
    fn snapshot_and_clear(&mut self) -> Result<CounterTable, CounterReadError> {
        Err(CounterReadError::MapNotFound("PAGECACHE_COUNTS"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_reports_one_sample_per_interval() {
    let source = Scripted(vec![
        CounterTable::new([20, 100, 5, 2]),
        CounterTable::new([100, 80, 10, 5]),
        CounterTable::new([0, 10, 0, 0]),
    ]);
    let (reporter, samples, stop) = StopAfter::new(3);

    let start = tokio::time::Instant::now();
    let mut sampler = Sampler::new(Duration::from_secs(5), source, reporter);
    sampler.run(async { let _ = stop.await; }).await.unwrap();

    assert_eq!(sampler.samples(), 3);
    assert!(start.elapsed() >= Duration::from_secs(15));

    let samples = samples.lock().unwrap();
    let ratios: Vec<f64> = samples.iter().map(|s| s.hit_ratio).collect();
    assert!((ratios[0] - 81.05).abs() < 0.01);
    assert_eq!(ratios[1], 0.0);
    assert!((ratios[2] - 100.0).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_each_interval_sees_only_its_own_events() {
    let counters = Arc::new(MemoryCounters::new());
    counters.add(EventClass::PageAccessed, 10);
    counters.add(EventClass::CacheInsert, 5);

    let (reporter, samples, stop) = StopAfter::new(2);
    let mut sampler = Sampler::new(Duration::from_secs(1), Arc::clone(&counters), reporter);
    sampler.run(async { let _ = stop.await; }).await.unwrap();

    let samples = samples.lock().unwrap();
    assert_eq!(samples[0].total, 10);
    assert_eq!(samples[0].hits, 5);
    // Nothing happened during the second interval
    assert_eq!(samples[1].total, 0);
    assert_eq!(samples[1].hit_ratio, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_discards_in_progress_interval() {
    let counters = Arc::new(MemoryCounters::new());
    counters.add(EventClass::PageAccessed, 42);

    let (reporter, samples, _stop) = StopAfter::new(usize::MAX);
    let mut sampler = Sampler::new(Duration::from_secs(60), Arc::clone(&counters), reporter);
    sampler.run(async {}).await.unwrap();

    assert_eq!(sampler.samples(), 0);
    assert!(samples.lock().unwrap().is_empty());
    // The interrupted interval was never drained
    assert_eq!(counters.drain()[EventClass::PageAccessed], 42);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_the_wait() {
    let (reporter, _samples, _stop) = StopAfter::new(usize::MAX);
    let mut sampler =
        Sampler::new(Duration::from_secs(3600), MemoryCounters::new(), reporter);

    let start = tokio::time::Instant::now();
    sampler
        .run(tokio::time::sleep(Duration::from_secs(1)))
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(3600));
    assert_eq!(sampler.samples(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_counter_read_failure_aborts_loop() {
    let (reporter, samples, _stop) = StopAfter::new(usize::MAX);
    let mut sampler = Sampler::new(Duration::from_secs(1), Broken, reporter);

    let err = sampler.run(std::future::pending()).await.unwrap_err();
    assert!(matches!(err, SamplerError::Counter(CounterReadError::MapNotFound(_))));
    assert!(samples.lock().unwrap().is_empty());
}
