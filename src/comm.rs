//! In-process message passing between ranks
//!
//! A world of `size` ranks is connected by one FIFO channel per ordered
//! pair of ranks, so messages from a given source always arrive in the
//! order they were sent. Receives name their source explicitly, which lets
//! the coordinator gather in rank order regardless of which rank finished
//! first.
//!
//! A rank that exits drops its channel ends; any peer still waiting on it
//! observes a disconnect and fails with [`SpgemmError::Communication`]
//! instead of blocking forever.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::{debug, error, trace};

use crate::error::{Result, SpgemmError};
use crate::matrix::CscMatrix;

/// Payloads exchanged between ranks
#[derive(Debug, Clone)]
pub enum Message {
    /// Transpose of the left operand, shared read-only by every rank
    Transpose(Arc<CscMatrix>),
    /// Number of entries in a partial product
    NonZeroCount(usize),
    /// Number of columns in a partial product
    ColumnCount(usize),
    /// Values of a partial product
    Values(Vec<f64>),
    /// Row indices of a partial product
    RowIndices(Vec<usize>),
    /// Local column pointers of a partial product
    ColumnPointers(Vec<usize>),
}

impl Message {
    /// Short name used in protocol errors
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Transpose(_) => "transpose",
            Message::NonZeroCount(_) => "non-zero count",
            Message::ColumnCount(_) => "column count",
            Message::Values(_) => "values",
            Message::RowIndices(_) => "row indices",
            Message::ColumnPointers(_) => "column pointers",
        }
    }
}

/// One rank's view of the world
pub struct Communicator {
    rank: usize,
    size: usize,
    /// `senders[dst]` is `None` for `dst == rank`
    senders: Vec<Option<Sender<Message>>>,
    /// `receivers[src]` is `None` for `src == rank`
    receivers: Vec<Option<Receiver<Message>>>,
}

/// Creates a fully connected world of `size` ranks
///
/// The returned communicators are in rank order.
pub fn create_world(size: usize) -> Result<Vec<Communicator>> {
    if size == 0 {
        return Err(SpgemmError::InvalidWorkers(
            "a world needs at least one rank".to_string(),
        ));
    }

    let mut senders: Vec<Vec<Option<Sender<Message>>>> =
        (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
    let mut receivers: Vec<Vec<Option<Receiver<Message>>>> =
        (0..size).map(|_| (0..size).map(|_| None).collect()).collect();

    for src in 0..size {
        for dst in 0..size {
            if src != dst {
                let (tx, rx) = channel();
                senders[src][dst] = Some(tx);
                receivers[dst][src] = Some(rx);
            }
        }
    }

    Ok(senders
        .into_iter()
        .zip(receivers)
        .enumerate()
        .map(|(rank, (senders, receivers))| Communicator {
            rank,
            size,
            senders,
            receivers,
        })
        .collect())
}

impl Communicator {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Sends a message to `dest`
    pub fn send(&self, dest: usize, message: Message) -> Result<()> {
        let tx = self.peer_sender(dest)?;
        trace!("rank {} -> {}: {}", self.rank, dest, message.kind());
        tx.send(message)
            .map_err(|_| SpgemmError::disconnected(self.rank, dest))
    }

    /// Blocks until the next message from `source` arrives
    pub fn recv(&self, source: usize) -> Result<Message> {
        let rx = self.peer_receiver(source)?;
        let message = rx
            .recv()
            .map_err(|_| SpgemmError::disconnected(source, self.rank))?;
        trace!("rank {} <- {}: {}", self.rank, source, message.kind());
        Ok(message)
    }

    /// Broadcasts a matrix from `root` to every rank
    ///
    /// `root` must pass `Some(matrix)`; other ranks pass `None` and receive
    /// the root's matrix.
    pub fn broadcast_matrix(
        &self,
        root: usize,
        matrix: Option<CscMatrix>,
    ) -> Result<Arc<CscMatrix>> {
        if self.rank == root {
            let matrix = Arc::new(matrix.ok_or_else(|| {
                SpgemmError::InvalidWorkers(format!("broadcast root {root} has no matrix"))
            })?);
            for dest in (0..self.size).filter(|&r| r != root) {
                self.send(dest, Message::Transpose(Arc::clone(&matrix)))?;
            }
            debug!(
                "rank {} broadcast {}×{} matrix with {} entries",
                root,
                matrix.rows,
                matrix.cols,
                matrix.nnz()
            );
            Ok(matrix)
        } else {
            match self.recv(root)? {
                Message::Transpose(matrix) => Ok(matrix),
                other => Err(protocol_error(root, "transpose", &other)),
            }
        }
    }

    /// Sends a partial product to `dest` in the fixed order: non-zero
    /// count, column count, values, row indices, column pointers
    pub fn send_partial(&self, dest: usize, partial: CscMatrix) -> Result<()> {
        let CscMatrix {
            cols,
            col_ptrs,
            row_indices,
            values,
            ..
        } = partial;

        self.send(dest, Message::NonZeroCount(values.len()))?;
        self.send(dest, Message::ColumnCount(cols))?;
        self.send(dest, Message::Values(values))?;
        self.send(dest, Message::RowIndices(row_indices))?;
        self.send(dest, Message::ColumnPointers(col_ptrs))
    }

    /// Receives a partial product with `rows` rows from `source`
    ///
    /// Any message out of order, or arrays disagreeing with the announced
    /// counts, is an error.
    pub fn recv_partial(&self, source: usize, rows: usize) -> Result<CscMatrix> {
        let nnz = match self.recv(source)? {
            Message::NonZeroCount(n) => n,
            other => return Err(protocol_error(source, "non-zero count", &other)),
        };
        let cols = match self.recv(source)? {
            Message::ColumnCount(n) => n,
            other => return Err(protocol_error(source, "column count", &other)),
        };
        let values = match self.recv(source)? {
            Message::Values(v) => v,
            other => return Err(protocol_error(source, "values", &other)),
        };
        let row_indices = match self.recv(source)? {
            Message::RowIndices(v) => v,
            other => return Err(protocol_error(source, "row indices", &other)),
        };
        let col_ptrs = match self.recv(source)? {
            Message::ColumnPointers(v) => v,
            other => return Err(protocol_error(source, "column pointers", &other)),
        };

        if values.len() != nnz {
            return Err(SpgemmError::length_mismatch("received values", nnz, values.len()));
        }

        CscMatrix::try_new(rows, cols, col_ptrs, row_indices, values)
    }

    /// Collects one partial product per rank at `root`, in rank order
    ///
    /// `root` passes its own partial; other ranks send theirs and get
    /// `None` back.
    pub fn gather_partials(
        &self,
        root: usize,
        own: CscMatrix,
        rows: usize,
    ) -> Result<Option<Vec<CscMatrix>>> {
        if self.rank != root {
            self.send_partial(root, own)?;
            return Ok(None);
        }

        let mut own = Some(own);
        let mut partials = Vec::with_capacity(self.size);
        for source in 0..self.size {
            if source == root {
                partials.extend(own.take());
            } else {
                partials.push(self.recv_partial(source, rows)?);
            }
        }
        debug!("rank {} gathered {} partials", root, partials.len());
        Ok(Some(partials))
    }

    fn peer_sender(&self, dest: usize) -> Result<&Sender<Message>> {
        self.senders
            .get(dest)
            .and_then(Option::as_ref)
            .ok_or_else(|| SpgemmError::Communication {
                from: self.rank,
                to: dest,
                reason: "no channel to this rank".to_string(),
            })
    }

    fn peer_receiver(&self, source: usize) -> Result<&Receiver<Message>> {
        self.receivers
            .get(source)
            .and_then(Option::as_ref)
            .ok_or_else(|| SpgemmError::Communication {
                from: source,
                to: self.rank,
                reason: "no channel from this rank".to_string(),
            })
    }
}

fn protocol_error(source: usize, expected: &'static str, got: &Message) -> SpgemmError {
    SpgemmError::Protocol {
        source_rank: source,
        expected,
        got: got.kind(),
    }
}

/// Runs `f` once per rank on its own thread and returns the results in
/// rank order
///
/// # Errors
///
/// Fails if the world cannot be created, a thread cannot be spawned, or a
/// rank panics.
pub fn run_world<F, R>(size: usize, f: F) -> Result<Vec<R>>
where
    F: Fn(Communicator) -> R + Sync,
    R: Send,
{
    let world = create_world(size)?;
    let f = &f;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(size);
        for comm in world {
            let rank = comm.rank();
            let handle = thread::Builder::new()
                .name(format!("rank-{rank}"))
                .spawn_scoped(scope, move || f(comm))
                .map_err(|e| SpgemmError::Execution(format!("failed to spawn rank {rank}: {e}")))?;
            handles.push(handle);
        }

        // An unjoined panicked rank would make the scope itself panic
        let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();

        joined
            .into_iter()
            .enumerate()
            .map(|(rank, result)| {
                result.map_err(|_| {
                    error!("rank {} panicked", rank);
                    SpgemmError::Execution(format!("rank {rank} panicked"))
                })
            })
            .collect()
    })
}
