use lamellar_motifs::{MotifCounts, PhaseTimings};

use std::io::{self, Write};

pub(crate) fn print_results(my_pe: usize, counts: &MotifCounts) -> io::Result<()> {
    if my_pe == 0 {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        counts.write_table(&mut out)?;
        out.flush()?;
    }
    Ok(())
}

pub(crate) fn print_phase_times(
    my_pe: usize,
    motif_size: usize,
    counts: &MotifCounts,
    times: &PhaseTimings,
) {
    if my_pe == 0 {
        println!(
            "summary: k={motif_size} subgraphs: {} labels: {} load: {:<6.6} replicate: {:<6.6} enumerate: {:<6.6} canonicalize: {:<6.6} gather: {:<6.6} total: {:<6.6}",
            counts.total(),
            counts.len(),
            times.load.as_secs_f64(),
            times.replicate.as_secs_f64(),
            times.enumerate.as_secs_f64(),
            times.canonicalize.as_secs_f64(),
            (times.synchronize + times.gather + times.merge).as_secs_f64(),
            times.total().as_secs_f64(),
        );
    }
}
