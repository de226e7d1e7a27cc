use mpi_collective_matmul::mpi_helpers::group::check_root_buffer;
use mpi_collective_matmul::mpi_helpers::is_root;
use mpi_collective_matmul::mpi_helpers::load_balance::interval_by_rank;
use mpi_collective_matmul::{ProcessGroup, Result};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

/// State shared by every rank of an in-process group
struct Shared {
    size: usize,
    barrier: Barrier,
    root_buffer: Mutex<Vec<f64>>,
    slots: Mutex<Vec<Vec<f64>>>,
    values: Mutex<Vec<f64>>,
}

/// One rank of a group whose ranks are threads of the test process.
///
/// Each collective is a write phase and a read phase separated by barriers,
/// so a rank cannot leave a collective before every rank has entered it.
pub struct ThreadGroup {
    rank: usize,
    shared: Arc<Shared>,
}

impl ThreadGroup {
    /// Run `body` on `size` threads, one per rank, and return the results in rank order
    pub fn run<T, F>(size: usize, body: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&ThreadGroup) -> T + Sync,
    {
        let shared = Arc::new(Shared {
            size,
            barrier: Barrier::new(size),
            root_buffer: Mutex::new(Vec::new()),
            slots: Mutex::new(vec![Vec::new(); size]),
            values: Mutex::new(vec![0.0; size]),
        });

        thread::scope(|scope| {
            let handles: Vec<_> = (0..size)
                .map(|rank| {
                    let group = ThreadGroup {
                        rank,
                        shared: Arc::clone(&shared),
                    };
                    let body = &body;
                    scope.spawn(move || body(&group))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        })
    }

    fn wait(&self) {
        self.shared.barrier.wait();
    }

    fn publish_root(&self, data: &[f64]) {
        let mut buffer = self.shared.root_buffer.lock().unwrap();
        buffer.clear();
        buffer.extend_from_slice(data);
    }

    fn read_chunk(&self, recv: &mut [f64]) {
        let buffer = self.shared.root_buffer.lock().unwrap();
        let chunk = interval_by_rank(self.rank as i32, recv.len());
        recv.copy_from_slice(&buffer[chunk.start_index..chunk.end_index]);
    }

    fn publish_slot(&self, send: &[f64]) {
        self.shared.slots.lock().unwrap()[self.rank] = send.to_vec();
    }
}

impl ProcessGroup for ThreadGroup {
    fn rank(&self) -> i32 {
        self.rank as i32
    }

    fn size(&self) -> i32 {
        self.shared.size as i32
    }

    fn scatter_from_root(&self, send: &[f64], recv: &mut [f64]) -> Result<()> {
        check_root_buffer(send.len(), recv.len(), self.size())?;
        self.publish_root(send);
        self.wait();
        self.read_chunk(recv);
        self.wait();
        Ok(())
    }

    fn scatter_into(&self, recv: &mut [f64]) -> Result<()> {
        self.wait();
        self.read_chunk(recv);
        self.wait();
        Ok(())
    }

    fn broadcast(&self, buffer: &mut [f64]) -> Result<()> {
        if is_root(self.rank()) {
            self.publish_root(buffer);
        }
        self.wait();
        if !is_root(self.rank()) {
            buffer.copy_from_slice(&self.shared.root_buffer.lock().unwrap());
        }
        self.wait();
        Ok(())
    }

    fn gather_into_root(&self, send: &[f64], recv: &mut [f64]) -> Result<()> {
        check_root_buffer(recv.len(), send.len(), self.size())?;
        self.publish_slot(send);
        self.wait();
        let slots = self.shared.slots.lock().unwrap();
        for (rank, slot) in slots.iter().enumerate() {
            let chunk = interval_by_rank(rank as i32, send.len());
            recv[chunk.start_index..chunk.end_index].copy_from_slice(slot);
        }
        drop(slots);
        self.wait();
        Ok(())
    }

    fn gather_from(&self, send: &[f64]) -> Result<()> {
        self.publish_slot(send);
        self.wait();
        self.wait();
        Ok(())
    }

    fn reduce_max_into_root(&self, value: f64) -> Result<f64> {
        self.shared.values.lock().unwrap()[self.rank] = value;
        self.wait();
        let max = self
            .shared
            .values
            .lock()
            .unwrap()
            .iter()
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        self.wait();
        Ok(max)
    }

    fn reduce_max(&self, value: f64) -> Result<()> {
        self.shared.values.lock().unwrap()[self.rank] = value;
        self.wait();
        self.wait();
        Ok(())
    }
}
