use when2fly_common::store::JobRegistry;

use futures::future;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::time;

use crate::jobs::Job;

struct JobContainer {
    job: Box<dyn Job>,
    run_frequency: Duration,
    last_run_time: SystemTime,
}

pub struct JobRunner {
    jobs: Vec<JobContainer>,
    update_frequency: Duration,
    job_registry: Arc<dyn JobRegistry>,
}

impl JobRunner {
    pub fn new(update_frequency: Duration, job_registry: Arc<dyn JobRegistry>) -> Self {
        Self {
            jobs: Vec::new(),
            update_frequency,
            job_registry,
        }
    }

    /// A job that has never run before waits a full `run_frequency` before its first run.
    pub async fn register(&mut self, job: Box<dyn Job>, run_frequency: Duration) {
        let job_name_ref = job.name();

        log::info!(
            "Registered job \"{}\" to run every {} seconds",
            job_name_ref,
            run_frequency.as_secs()
        );

        let job_registry = Arc::clone(&self.job_registry);
        let last_run_time = tokio::task::spawn_blocking(move || {
            job_registry
                .get_job_last_run_timestamp(job_name_ref)
                .unwrap_or_else(|e| {
                    log::error!(
                        "Failed to get last run timestamp for job '{}': {}",
                        job_name_ref,
                        e
                    );
                    None
                })
        })
        .await
        .unwrap_or_else(|e| {
            log::error!("Failed to join Tokio task: {}", e);
            None
        });

        let job_container = JobContainer {
            job,
            run_frequency,
            last_run_time: last_run_time.unwrap_or(SystemTime::now()),
        };

        self.jobs.push(job_container);
    }

    pub async fn start(&mut self) -> ! {
        loop {
            let before = Instant::now();

            self.run_due_jobs().await;

            let delta = Instant::now() - before;

            if delta < self.update_frequency {
                time::sleep(self.update_frequency - delta).await;
            }
        }
    }

    /// Runs every job whose run frequency has elapsed, concurrently, and records the runs.
    /// Returns the number of jobs that were started.
    async fn run_due_jobs(&mut self) -> usize {
        let now = SystemTime::now();

        let mut job_names = Vec::with_capacity(self.jobs.len());
        let mut job_futures = Vec::with_capacity(self.jobs.len());
        let mut record_job_run_futures = Vec::with_capacity(self.jobs.len());

        for job_container in &mut self.jobs {
            let time_elapsed_since_last_run = now
                .duration_since(job_container.last_run_time)
                .unwrap_or(Duration::from_nanos(0));
            let is_time_to_run = time_elapsed_since_last_run >= job_container.run_frequency;

            if !is_time_to_run || !job_container.job.is_ready() {
                continue;
            }

            job_container.last_run_time = now;

            let job = &mut job_container.job;
            let name_ref = job.name();
            log::info!("Executing job \"{}\"", name_ref);
            job_names.push(name_ref);
            job_futures.push(job.execute());

            let job_registry = Arc::clone(&self.job_registry);
            let record_run_task = tokio::task::spawn_blocking(move || {
                job_registry.set_job_last_run_timestamp(name_ref, now)
            });

            record_job_run_futures.push(record_run_task);
        }

        let started_count = job_futures.len();

        let (job_results, recording_results) = future::join(
            future::join_all(job_futures),
            future::join_all(record_job_run_futures),
        )
        .await;

        for (i, result) in job_results.into_iter().enumerate() {
            if let Err(e) = result {
                log::error!("Job \"{}\" failed: {}", job_names[i], e);
            } else {
                log::info!("Job \"{}\" finished successfully", job_names[i]);
            }
        }

        for result in recording_results.into_iter() {
            match result {
                Ok(Ok(())) => (),
                Ok(Err(e)) => log::error!("Error recording job run: {}", e),
                Err(e) => log::error!("Failed to join Tokio task: {}", e),
            }
        }

        started_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use when2fly_common::store::MemoryStore;

    use crate::jobs::tests::MockJob;

    fn registry() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_register() {
        let mut job_runner = JobRunner::new(Duration::from_micros(200), registry());
        assert_eq!(job_runner.update_frequency, Duration::from_micros(200));
        assert!(job_runner.jobs.is_empty());

        job_runner
            .register(Box::new(MockJob::new("One")), Duration::from_millis(1))
            .await;
        assert_eq!(job_runner.jobs.len(), 1);

        job_runner
            .register(Box::new(MockJob::new("Two")), Duration::from_millis(3))
            .await;
        assert_eq!(job_runner.jobs.len(), 2);
    }

    #[tokio::test]
    async fn test_register_resumes_from_recorded_run() {
        let registry = registry();
        let long_ago = SystemTime::now() - Duration::from_secs(3600);
        registry
            .set_job_last_run_timestamp("Resumed", long_ago)
            .unwrap();

        let mut job_runner = JobRunner::new(Duration::from_millis(1), registry.clone());
        let job = MockJob::new("Resumed");
        let runs = Arc::clone(&job.runs);

        job_runner
            .register(Box::new(job), Duration::from_secs(60))
            .await;
        assert_eq!(job_runner.jobs[0].last_run_time, long_ago);

        // Overdue according to the registry, so it runs on the first tick
        assert_eq!(job_runner.run_due_jobs().await, 1);
        assert_eq!(*runs.lock().unwrap(), 1);

        let recorded = registry
            .get_job_last_run_timestamp("Resumed")
            .unwrap()
            .unwrap();
        assert!(recorded > long_ago);

        // Not due again for another minute
        assert_eq!(job_runner.run_due_jobs().await, 0);
        assert_eq!(*runs.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_new_job_waits_for_first_interval() {
        let mut job_runner = JobRunner::new(Duration::from_millis(1), registry());
        let job = MockJob::new("Fresh");
        let runs = Arc::clone(&job.runs);

        job_runner
            .register(Box::new(job), Duration::from_secs(60))
            .await;

        assert_eq!(job_runner.run_due_jobs().await, 0);
        assert_eq!(*runs.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failing_job_is_still_recorded() {
        let registry = registry();
        let mut job_runner = JobRunner::new(Duration::from_millis(1), registry.clone());

        let mut job = MockJob::new("Failing");
        job.fail = true;
        let runs = Arc::clone(&job.runs);

        job_runner.register(Box::new(job), Duration::ZERO).await;

        assert_eq!(job_runner.run_due_jobs().await, 1);
        assert_eq!(*runs.lock().unwrap(), 1);
        assert!(registry
            .get_job_last_run_timestamp("Failing")
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_busy_job_is_skipped() {
        let mut job_runner = JobRunner::new(Duration::from_millis(1), registry());

        let mut job = MockJob::new("Busy");
        job.is_running = true;
        let runs = Arc::clone(&job.runs);

        job_runner.register(Box::new(job), Duration::ZERO).await;

        assert_eq!(job_runner.run_due_jobs().await, 0);
        assert_eq!(*runs.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_start() {
        let mut job_runner = JobRunner::new(Duration::from_millis(1), registry());

        let job = MockJob::new("Looping");
        let runs = Arc::clone(&job.runs);

        job_runner.register(Box::new(job), Duration::ZERO).await;

        let handle = tokio::task::spawn(async move {
            job_runner.start().await;
        });

        time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(*runs.lock().unwrap() >= 2);
    }
}
