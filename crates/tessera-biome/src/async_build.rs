//! Background biome slice rebuilds on a pool of worker threads.
//!
//! Each worker owns the slice it is building until it is finished, then hands
//! it back frozen behind an [`Arc`] so mesh builders can share it read-only.
//! Completed slices are delivered through a bounded channel and collected on
//! the render thread once per frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::section::{SectionBiomes, SectionNeighborhood, SectionPos};
use crate::slice::BiomeSlice;

/// A request to rebuild the slice around one render region.
#[derive(Clone, Debug)]
pub struct SliceTask {
    /// Snapshot of the 27 sections around the region; the center is the region key.
    pub neighborhood: SectionNeighborhood<Arc<SectionBiomes>>,
    /// World biome seed.
    pub biome_seed: i64,
    /// Whether the world stores biomes in 3D.
    pub is_3d: bool,
}

impl SliceTask {
    /// Region this task rebuilds.
    pub fn region(&self) -> SectionPos {
        self.neighborhood.center()
    }
}

/// A finished slice ready to be swapped into a render region.
#[derive(Debug)]
pub struct BuiltSlice {
    /// Center section of the region.
    pub region: SectionPos,
    /// The frozen slice.
    pub slice: Arc<BiomeSlice>,
    /// Build time in microseconds.
    pub build_time_us: u64,
    generation: u64,
}

/// Errors returned by [`AsyncSliceBuilder::submit`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Too many builds are in flight; the task is handed back.
    #[error("slice build queue is full")]
    QueueFull(Box<SliceTask>),
    /// Every worker thread has exited.
    #[error("slice build workers have shut down")]
    Disconnected,
}

struct QueuedTask {
    task: SliceTask,
    generation: u64,
    cancelled: Arc<AtomicBool>,
}

/// Rebuilds biome slices for many regions concurrently.
pub struct AsyncSliceBuilder {
    task_sender: Sender<QueuedTask>,
    result_receiver: Receiver<BuiltSlice>,
    /// Cancellation flag of the newest pending build per region.
    active_tasks: Arc<DashMap<SectionPos, (u64, Arc<AtomicBool>)>>,
    in_flight: Arc<AtomicU64>,
    next_generation: AtomicU64,
    max_concurrent: u64,
}

impl AsyncSliceBuilder {
    /// Creates a pool of `thread_count` workers.
    ///
    /// At most `max_concurrent` builds may be queued or running at once;
    /// `result_capacity` bounds the number of finished slices awaiting
    /// [`Self::drain_completed`].
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedTask>(max_concurrent.max(1));
        let (result_sender, result_receiver) = bounded::<BuiltSlice>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));

        for worker in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);

            std::thread::Builder::new()
                .name(format!("biome-slice-{worker}"))
                .spawn(move || {
                    while let Ok(queued) = receiver.recv() {
                        if queued.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let start = std::time::Instant::now();
                        let task = &queued.task;
                        let slice =
                            BiomeSlice::build(&task.neighborhood, task.biome_seed, task.is_3d);
                        let elapsed = start.elapsed().as_micros() as u64;

                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let delivered = sender.send(BuiltSlice {
                                region: task.region(),
                                slice: Arc::new(slice),
                                build_time_us: elapsed,
                                generation: queued.generation,
                            });
                            if delivered.is_err() {
                                in_flight.fetch_sub(1, Ordering::Relaxed);
                                break;
                            }
                        } else {
                            tracing::trace!(region = ?task.region(), "dropped cancelled slice build");
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }

        tracing::debug!(thread_count, max_concurrent, "started biome slice workers");

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
            next_generation: AtomicU64::new(0),
            max_concurrent: max_concurrent.max(1) as u64,
        })
    }

    /// Creates a pool sized from the number of CPU cores.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn with_defaults() -> std::io::Result<Self> {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 2).max(1);
        Self::new(threads, 64, 128)
    }

    /// Queues a rebuild. A pending build for the same region is superseded.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::QueueFull`] with the task when the in-flight
    /// limit is reached, or [`SubmitError::Disconnected`] if the workers are gone.
    pub fn submit(&self, task: SliceTask) -> Result<(), SubmitError> {
        if self.in_flight.load(Ordering::Relaxed) >= self.max_concurrent {
            return Err(SubmitError::QueueFull(Box::new(task)));
        }

        let region = task.region();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));

        let previous = self
            .active_tasks
            .insert(region, (generation, Arc::clone(&cancelled)));
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        let queued = QueuedTask {
            task,
            generation,
            cancelled,
        };
        match self.task_sender.try_send(queued) {
            Ok(()) => {
                if let Some((_, superseded)) = previous {
                    superseded.store(true, Ordering::Relaxed);
                }
                Ok(())
            }
            Err(e) => {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                self.restore_entry(region, generation, previous);
                Err(match e {
                    TrySendError::Full(queued) => SubmitError::QueueFull(Box::new(queued.task)),
                    TrySendError::Disconnected(_) => SubmitError::Disconnected,
                })
            }
        }
    }

    /// Puts back the entry a failed submit displaced, unless a newer submit
    /// has already replaced it.
    fn restore_entry(
        &self,
        region: SectionPos,
        generation: u64,
        previous: Option<(u64, Arc<AtomicBool>)>,
    ) {
        if let Entry::Occupied(mut entry) = self.active_tasks.entry(region)
            && entry.get().0 == generation
        {
            match previous {
                Some(previous) => {
                    entry.insert(previous);
                }
                None => {
                    entry.remove();
                }
            }
        }
    }

    /// Cancels the pending build for `region`, if any.
    ///
    /// A build already running finishes but is not delivered.
    pub fn cancel(&self, region: &SectionPos) {
        if let Some((_, (_, cancelled))) = self.active_tasks.remove(region) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Collects up to `max` finished slices. Call once per frame.
    ///
    /// Slices superseded or cancelled after they finished are discarded here.
    pub fn drain_completed(&self, max: usize) -> Vec<BuiltSlice> {
        let mut results = Vec::new();
        while results.len() < max {
            let Ok(built) = self.result_receiver.try_recv() else {
                break;
            };
            let current = self
                .active_tasks
                .remove_if(&built.region, |_, (g, _)| *g == built.generation)
                .is_some();
            if current {
                results.push(built);
            }
        }
        results
    }

    /// Number of builds queued or executing.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a build for `region` has not been collected yet.
    pub fn is_pending(&self, region: &SectionPos) -> bool {
        self.active_tasks.contains_key(region)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::BiomeId;

    fn task_at(center: SectionPos, biome: BiomeId) -> SliceTask {
        let section = Arc::new(SectionBiomes::filled(biome));
        SliceTask {
            neighborhood: SectionNeighborhood::from_fn(center, |_, _, _| Some(Arc::clone(&section))),
            biome_seed: 42,
            is_3d: true,
        }
    }

    fn collect(builder: &AsyncSliceBuilder, expected: usize) -> Vec<BuiltSlice> {
        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(30);
        while results.len() < expected && Instant::now() < deadline {
            results.extend(builder.drain_completed(usize::MAX));
            if results.len() < expected {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        results
    }

    #[test]
    fn test_concurrent_builds_match_sync() {
        let builder = AsyncSliceBuilder::new(4, 64, 64).unwrap();

        let mut submitted = Vec::new();
        for x in 0..4 {
            for z in 0..4 {
                let task = task_at(SectionPos::new(x, 0, z), BiomeId((x * 4 + z) as u16));
                submitted.push(task.clone());
                builder.submit(task).unwrap();
            }
        }

        let results = collect(&builder, submitted.len());
        assert_eq!(results.len(), submitted.len());

        for built in &results {
            let task = submitted
                .iter()
                .find(|t| t.region() == built.region)
                .unwrap();
            let expected = BiomeSlice::build(&task.neighborhood, task.biome_seed, task.is_3d);
            assert_eq!(*built.slice, expected);
        }
        assert!(!builder.is_pending(&SectionPos::new(0, 0, 0)));
    }

    #[test]
    fn test_resubmit_supersedes_pending_build() {
        let builder = AsyncSliceBuilder::new(1, 64, 64).unwrap();
        let region = SectionPos::new(9, 1, -2);

        builder.submit(task_at(region, BiomeId(1))).unwrap();
        builder.submit(task_at(region, BiomeId(2))).unwrap();

        let deadline = Instant::now() + Duration::from_secs(30);
        let mut results = Vec::new();
        while (builder.in_flight() > 0 || results.is_empty()) && Instant::now() < deadline {
            results.extend(builder.drain_completed(usize::MAX));
            std::thread::sleep(Duration::from_millis(5));
        }
        results.extend(builder.drain_completed(usize::MAX));

        assert_eq!(results.len(), 1, "only the newest build is delivered");
        assert_eq!(results[0].slice.cell_biome(6, 6, 6), Some(BiomeId(2)));
    }

    #[test]
    fn test_cancel_clears_pending() {
        let builder = AsyncSliceBuilder::new(1, 64, 64).unwrap();
        let region = SectionPos::new(50, 0, 50);
        builder.submit(task_at(region, BiomeId(1))).unwrap();
        assert!(builder.is_pending(&region));

        builder.cancel(&region);
        assert!(!builder.is_pending(&region));

        let deadline = Instant::now() + Duration::from_secs(30);
        while builder.in_flight() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(builder.drain_completed(usize::MAX).is_empty());
    }

    #[test]
    fn test_queue_full_returns_task() {
        let builder = AsyncSliceBuilder::new(1, 1, 4).unwrap();
        let mut rejected = None;
        for i in 0..32 {
            if let Err(err) = builder.submit(task_at(SectionPos::new(i, 0, 0), BiomeId(0))) {
                rejected = Some(err);
                break;
            }
        }
        match rejected {
            Some(SubmitError::QueueFull(task)) => assert!(task.region().x > 0),
            other => panic!("expected QueueFull, got {other:?}"),
        }
    }

    /// Builder with no workers, whose task queue holds `capacity` tasks.
    fn idle_builder(capacity: usize) -> (AsyncSliceBuilder, Receiver<QueuedTask>) {
        let (task_sender, task_receiver) = bounded(capacity);
        let (_, result_receiver) = bounded(1);
        let builder = AsyncSliceBuilder {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight: Arc::new(AtomicU64::new(0)),
            next_generation: AtomicU64::new(0),
            max_concurrent: 8,
        };
        (builder, task_receiver)
    }

    #[test]
    fn test_rejected_resubmit_keeps_pending_build() {
        let (builder, queue) = idle_builder(1);
        let region = SectionPos::new(4, 0, 4);

        builder.submit(task_at(region, BiomeId(1))).unwrap();
        let (first_generation, first_flag) = builder.active_tasks.get(&region).unwrap().clone();

        let err = builder.submit(task_at(region, BiomeId(2))).unwrap_err();
        assert!(matches!(err, SubmitError::QueueFull(_)));

        assert!(!first_flag.load(Ordering::Relaxed));
        assert_eq!(builder.active_tasks.get(&region).unwrap().0, first_generation);
        assert_eq!(builder.in_flight(), 1);

        let queued = queue.try_recv().unwrap();
        assert_eq!(queued.generation, first_generation);
        assert!(!queued.cancelled.load(Ordering::Relaxed));
    }

    #[test]
    fn test_disconnected_submit_leaves_no_pending_entry() {
        let (builder, queue) = idle_builder(4);
        drop(queue);
        let region = SectionPos::new(-3, 2, 8);

        let err = builder.submit(task_at(region, BiomeId(1))).unwrap_err();
        assert!(matches!(err, SubmitError::Disconnected));
        assert!(!builder.is_pending(&region));
        assert_eq!(builder.in_flight(), 0);
    }

    #[test]
    fn test_accepted_resubmit_cancels_previous_flag() {
        let (builder, queue) = idle_builder(4);
        let region = SectionPos::new(0, 0, 0);

        builder.submit(task_at(region, BiomeId(1))).unwrap();
        builder.submit(task_at(region, BiomeId(2))).unwrap();

        let first = queue.try_recv().unwrap();
        let second = queue.try_recv().unwrap();
        assert!(first.cancelled.load(Ordering::Relaxed));
        assert!(!second.cancelled.load(Ordering::Relaxed));
        assert_eq!(builder.active_tasks.get(&region).unwrap().0, second.generation);
    }

    #[test]
    fn test_drain_respects_max() {
        let builder = AsyncSliceBuilder::new(2, 64, 64).unwrap();
        for i in 0..6 {
            builder.submit(task_at(SectionPos::new(i, 0, 0), BiomeId(0))).unwrap();
        }
        let deadline = Instant::now() + Duration::from_secs(30);
        while builder.in_flight() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(builder.drain_completed(4).len(), 4);
        assert_eq!(builder.drain_completed(4).len(), 2);
    }
}
