use crossbeam::channel::{bounded, unbounded, Receiver, Select, Sender};
use itertools::Itertools;
use log::*;
use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use super::types::{AlignmentSource, SchedulerConfig, Variant, VariantProcessor, VariantRecord};
use super::units::{split_into_units, CompletedUnit, ReorderBuffer, WorkUnit};
use crate::core::error::{Result, VcmError};

type UnitOutcome = Result<CompletedUnit>;

/// Counters reported once the variant source is exhausted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Variants read from the source.
    pub seen: usize,
    /// Variants dropped by the pass filter.
    pub dropped: usize,
    /// Lines written.
    pub written: usize,
    /// Units dispatched.
    pub units: usize,
}

/// Parallel variant executor.
///
/// Each worker owns one alignment source built by `factory` when the pool
/// starts. Results are written by the calling thread strictly in dispatch order.
pub struct ParVariants<P, F> {
    config: SchedulerConfig,
    processor: P,
    factory: F,
}

impl<P, F, A> ParVariants<P, F>
where
    P: VariantProcessor,
    F: Fn() -> Result<A> + Sync,
    A: AlignmentSource,
{
    pub fn new(config: SchedulerConfig, processor: P, factory: F) -> Result<Self> {
        let config = config.validate()?;
        info!("Using {} worker threads.", config.workers);
        Ok(Self {
            config,
            processor,
            factory,
        })
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Drain `variants`, writing one line per dispatched variant into `out`.
    pub fn run<I, W>(&self, variants: I, out: &mut W) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<VariantRecord>>,
        W: Write + ?Sized,
    {
        let workers = self.config.workers;
        thread::scope(|scope| {
            let (work_tx, work_rx) = bounded::<WorkUnit>(workers);
            let (result_tx, result_rx) = unbounded::<UnitOutcome>();

            let handles: Vec<_> = (0..workers)
                .map(|worker_id| {
                    let work_rx = work_rx.clone();
                    let result_tx = result_tx.clone();
                    let factory = &self.factory;
                    let processor = &self.processor;
                    scope.spawn(move || worker_loop(worker_id, factory, processor, work_rx, result_tx))
                })
                .collect();
            drop(work_rx);
            drop(result_tx);

            let outcome = self.drive(variants, out, work_tx, &result_rx);
            drop(result_rx);

            for handle in handles {
                if handle.join().is_err() {
                    return Err(VcmError::WorkerPanicked(
                        "worker thread exited abnormally".to_string(),
                    ));
                }
            }
            outcome
        })
    }

    fn drive<I, W>(
        &self,
        variants: I,
        out: &mut W,
        work_tx: Sender<WorkUnit>,
        result_rx: &Receiver<UnitOutcome>,
    ) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<VariantRecord>>,
        W: Write + ?Sized,
    {
        let mut summary = RunSummary::default();
        let mut reorder = ReorderBuffer::new();
        let window = self.config.reorder_window();
        let batch_size = self.config.batch_size.unwrap_or(usize::MAX);

        let batches = variants.into_iter().chunks(batch_size);
        for batch in &batches {
            let batch: Vec<VariantRecord> = batch.collect::<Result<_>>()?;
            if batch.is_empty() {
                break;
            }
            summary.seen += batch.len();

            if self.config.message {
                let (first, last) = (&batch[0].variant, &batch[batch.len() - 1].variant);
                info!(
                    "Processing variants: {}:{} to {}:{}",
                    first.contig, first.pos, last.contig, last.pos
                );
            }

            let passing: Vec<Variant> = self.filter_batch(batch, &mut summary);
            let unit_size = self
                .config
                .unit_size
                .resolve(self.config.workers, passing.len());
            debug!(
                "Dispatching {} variants in units of {}",
                passing.len(),
                unit_size
            );

            for unit in split_into_units(passing, unit_size, summary.units) {
                summary.units += 1;
                let mut pending = Some(unit);
                while let Some(unit) = pending.take() {
                    let in_flight = summary.units - 1 - reorder.released();
                    if in_flight >= window {
                        let outcome = recv_outcome(result_rx)?;
                        summary.written += accept(outcome, &mut reorder, out)?;
                        pending = Some(unit);
                        continue;
                    }

                    let mut select = Select::new();
                    let send_index = select.send(&work_tx);
                    let recv_index = select.recv(result_rx);
                    let oper = select.select();
                    if oper.index() == send_index {
                        if oper.send(&work_tx, unit).is_err() {
                            return Err(workers_gone(result_rx));
                        }
                    } else {
                        debug_assert_eq!(oper.index(), recv_index);
                        let outcome = oper.recv(result_rx).map_err(|_| workers_gone(result_rx))?;
                        summary.written += accept(outcome, &mut reorder, out)?;
                        pending = Some(unit);
                    }
                }
            }
        }

        drop(work_tx);
        while reorder.released() < summary.units {
            let outcome = recv_outcome(result_rx)?;
            summary.written += accept(outcome, &mut reorder, out)?;
        }
        out.flush()?;

        info!(
            "Processed {} variants ({} dropped by filter, {} lines written)",
            summary.seen, summary.dropped, summary.written
        );
        Ok(summary)
    }

    fn filter_batch(&self, batch: Vec<VariantRecord>, summary: &mut RunSummary) -> Vec<Variant> {
        let before = batch.len();
        let passing: Vec<Variant> = batch
            .into_iter()
            .filter(|record| !self.config.pass_only || record.passed)
            .map(|record| record.variant)
            .collect();
        summary.dropped += before - passing.len();
        passing
    }
}

/// Process `variants` on the calling thread with a single alignment source.
pub fn run_serial<A, P, I, W>(
    source: &mut A,
    processor: &P,
    variants: I,
    pass_only: bool,
    out: &mut W,
) -> Result<RunSummary>
where
    A: AlignmentSource,
    P: VariantProcessor,
    I: IntoIterator<Item = Result<VariantRecord>>,
    W: Write + ?Sized,
{
    let mut summary = RunSummary::default();
    for record in variants {
        let record = record?;
        summary.seen += 1;
        if pass_only && !record.passed {
            summary.dropped += 1;
            continue;
        }
        let line = process_one(source, processor, &record.variant)?;
        out.write_all(line.as_bytes())?;
        summary.written += 1;
    }
    out.flush()?;
    Ok(summary)
}

fn worker_loop<A, F, P>(
    worker_id: usize,
    factory: &F,
    processor: &P,
    work_rx: Receiver<WorkUnit>,
    result_tx: Sender<UnitOutcome>,
) where
    A: AlignmentSource,
    F: Fn() -> Result<A>,
    P: VariantProcessor,
{
    let mut source = match factory() {
        Ok(source) => source,
        Err(err) => {
            error!("Worker {} failed to open its alignment source: {}", worker_id, err);
            let _ = result_tx.send(Err(err));
            return;
        }
    };
    trace!("Worker {} ready", worker_id);

    for unit in work_rx.iter() {
        let seq = unit.seq;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            unit.variants
                .iter()
                .map(|variant| process_one(&mut source, processor, variant))
                .collect::<Result<Vec<String>>>()
        }))
        .unwrap_or_else(|payload| Err(VcmError::WorkerPanicked(panic_message(payload.as_ref()))));

        let failed = outcome.is_err();
        if result_tx
            .send(outcome.map(|lines| CompletedUnit { seq, lines }))
            .is_err()
            || failed
        {
            return;
        }
    }
    trace!("Worker {} finished", worker_id);
}

fn process_one<A, P>(source: &mut A, processor: &P, variant: &Variant) -> Result<String>
where
    A: AlignmentSource,
    P: VariantProcessor,
{
    source
        .fetch(&variant.contig, variant.start, variant.stop)
        .and_then(|reads| processor.process_variant(variant, &reads))
        .map_err(|err| {
            error!("{}", variant);
            err
        })
}

fn recv_outcome(result_rx: &Receiver<UnitOutcome>) -> Result<UnitOutcome> {
    result_rx.recv().map_err(|_| workers_gone(result_rx))
}

/// The first error still queued by a worker, if any.
fn workers_gone(result_rx: &Receiver<UnitOutcome>) -> VcmError {
    result_rx
        .try_iter()
        .find_map(|outcome| outcome.err())
        .unwrap_or_else(|| VcmError::WorkerPanicked("all workers exited before the run ended".into()))
}

/// Buffer a completed unit and flush whatever is now in order. Returns lines written.
fn accept<W: Write + ?Sized>(
    outcome: UnitOutcome,
    reorder: &mut ReorderBuffer<Vec<String>>,
    out: &mut W,
) -> Result<usize> {
    let completed = outcome?;
    reorder.push(completed.seq, completed.lines);

    let mut written = 0;
    while let Some(lines) = reorder.pop_ready() {
        for line in &lines {
            out.write_all(line.as_bytes())?;
        }
        written += lines.len();
    }
    if reorder.held() > 0 {
        trace!(
            "{} units held back waiting for unit {}",
            reorder.held(),
            reorder.released()
        );
    }
    Ok(written)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
