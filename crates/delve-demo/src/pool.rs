//! Fixed worker pool that carves chunk columns in the background.
//!
//! Tasks and results travel over bounded channels. Every worker shares one
//! read-only [`CarveWorld`], so the carved output of a chunk never depends on
//! which thread ran it or in what order.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use delve_carve::{CarveStats, Carver, CellBiomeSource};
use delve_voxel::{ChunkColumn, VoxelTypeId};

/// Voxel the demo terrain is made of.
pub const STONE: VoxelTypeId = VoxelTypeId(1);
/// Columns are solid below this height before carving.
pub const SURFACE_HEIGHT: i32 = 128;

/// Everything a worker needs to carve a chunk.
pub struct CarveWorld {
    pub seed: i64,
    pub carvers: Arc<Vec<Carver>>,
    pub biomes: CellBiomeSource,
}

/// A chunk to carve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CarveTask {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

/// A carved chunk column.
#[derive(Debug)]
pub struct CarvedChunk {
    pub task: CarveTask,
    pub column: ChunkColumn,
    pub stats: CarveStats,
    /// Carve time in microseconds.
    pub elapsed_us: u64,
}

/// Fills a stone column and runs every carver over it.
pub fn carve_column(world: &CarveWorld, task: CarveTask) -> (ChunkColumn, CarveStats) {
    let mut column = ChunkColumn::new();
    column.fill_layers(0, SURFACE_HEIGHT, STONE);
    column.clear_dirty();

    let mut stats = CarveStats::default();
    for carver in world.carvers.iter() {
        stats += carver.carve_chunk(
            world.seed,
            &world.biomes,
            task.chunk_x,
            task.chunk_z,
            &mut column,
        );
    }
    (column, stats)
}

pub struct CarvePool {
    task_sender: Option<Sender<CarveTask>>,
    result_receiver: Receiver<CarvedChunk>,
    workers: Vec<JoinHandle<()>>,
}

impl CarvePool {
    /// Spawns `thread_count` workers (at least one) with queues of `capacity`.
    pub fn new(
        world: Arc<CarveWorld>,
        thread_count: usize,
        capacity: usize,
    ) -> std::io::Result<Self> {
        let capacity = capacity.max(1);
        let (task_sender, task_receiver) = bounded::<CarveTask>(capacity);
        let (result_sender, result_receiver) = bounded::<CarvedChunk>(capacity);

        let mut workers = Vec::with_capacity(thread_count.max(1));
        for _ in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let world = Arc::clone(&world);

            let handle = std::thread::Builder::new()
                .name("carve-worker".into())
                .spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        let start = Instant::now();
                        let (column, stats) = carve_column(&world, task);
                        let elapsed_us = start.elapsed().as_micros() as u64;
                        let result = CarvedChunk {
                            task,
                            column,
                            stats,
                            elapsed_us,
                        };
                        if sender.send(result).is_err() {
                            break;
                        }
                    }
                })?;
            workers.push(handle);
        }

        Ok(Self {
            task_sender: Some(task_sender),
            result_receiver,
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Carves every task and returns the results sorted by chunk coordinate.
    ///
    /// Submission and collection are interleaved so bounded queues cannot
    /// deadlock.
    pub fn run(&self, tasks: Vec<CarveTask>) -> Vec<CarvedChunk> {
        let total = tasks.len();
        let mut results = Vec::with_capacity(total);
        let Some(task_sender) = &self.task_sender else {
            return results;
        };

        let mut pending = tasks.into_iter().peekable();
        while results.len() < total {
            if let Some(&task) = pending.peek() {
                match task_sender.try_send(task) {
                    Ok(()) => {
                        pending.next();
                        continue;
                    }
                    Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }
            match self.result_receiver.recv() {
                Ok(chunk) => results.push(chunk),
                Err(_) => break,
            }
        }

        if results.len() < total {
            tracing::warn!(expected = total, received = results.len(), "carve pool stopped early");
        }
        results.sort_by_key(|chunk| chunk.task);
        results
    }

    /// Closes the task queue and waits for every worker to exit.
    pub fn shutdown(mut self) {
        self.task_sender = None;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("carve worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_carve::{BiomeCarveProfile, CarverConfig, Range};

    fn world() -> Arc<CarveWorld> {
        let mut config =
            CarverConfig::new("cave", Range::new(20, 60), Range::new(2, 4), Range::new(60, 100));
        config.start_bias = [1.0, 0.3, 1.0];
        config.mutate = [3.0, 8.0, 3.0, 0.6];
        let carver = Carver::new(config).unwrap().with_carving_radius(2);
        let biomes = CellBiomeSource::new(
            9,
            64,
            vec![
                BiomeCarveProfile::new("plains").with_chance("cave", 60),
                BiomeCarveProfile::new("mountains").with_chance("cave", 90),
            ],
        );
        Arc::new(CarveWorld {
            seed: 9,
            carvers: Arc::new(vec![carver]),
            biomes,
        })
    }

    fn tasks() -> Vec<CarveTask> {
        let mut tasks = Vec::new();
        for chunk_x in -2..=2 {
            for chunk_z in -2..=2 {
                tasks.push(CarveTask { chunk_x, chunk_z });
            }
        }
        tasks
    }

    #[test]
    fn test_pool_matches_synchronous_carve() {
        let world = world();
        let pool = CarvePool::new(Arc::clone(&world), 3, 2).unwrap();
        let results = pool.run(tasks());
        pool.shutdown();

        assert_eq!(results.len(), 25);
        for chunk in &results {
            let (column, stats) = carve_column(&world, chunk.task);
            assert_eq!(chunk.stats, stats, "stats differ for {:?}", chunk.task);
            assert_eq!(chunk.column, column, "column differs for {:?}", chunk.task);
        }
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let world = world();
        let single = CarvePool::new(Arc::clone(&world), 1, 1).unwrap();
        let many = CarvePool::new(Arc::clone(&world), 4, 8).unwrap();
        let mut reversed = tasks();
        reversed.reverse();

        let a = single.run(tasks());
        let b = many.run(reversed);
        single.shutdown();
        many.shutdown();

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.task, y.task);
            assert_eq!(x.column, y.column);
        }
    }

    #[test]
    fn test_empty_run() {
        let pool = CarvePool::new(world(), 2, 4).unwrap();
        assert_eq!(pool.worker_count(), 2);
        assert!(pool.run(Vec::new()).is_empty());
        pool.shutdown();
    }

    #[test]
    fn test_zero_threads_spawns_one_worker() {
        let pool = CarvePool::new(world(), 0, 0).unwrap();
        assert_eq!(pool.worker_count(), 1);
        assert_eq!(pool.run(tasks()).len(), 25);
        pool.shutdown();
    }

    #[test]
    fn test_carve_column_only_removes_stone() {
        let world = world();
        let (column, stats) = carve_column(&world, CarveTask { chunk_x: 0, chunk_z: 0 });
        let stone = column.count(STONE);
        assert_eq!(stone + stats.voxels as usize, (SURFACE_HEIGHT * 16 * 16) as usize);
    }
}
