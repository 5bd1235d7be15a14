use std::f64::consts::TAU;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use trajkit_batch::{ade, fde, process_velocity, velocity, BatchShape, TrajectoryBatch, XY};
use trajkit_transform::{
    nabs_process, normalize, random_rotate, reverse, swap_xy, unnormalize, NormParams,
    TurningAugment,
};

#[derive(Parser)]
#[command(name = "trajkit")]
#[command(about = "Trajectory augmentation, normalization and displacement-error toolkit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shape of the synthetic trajectory set.
#[derive(Args, Debug, Clone)]
struct SynthArgs {
    /// Number of trajectories to generate (split evenly into train and test)
    #[arg(long, default_value_t = 200)]
    n_trajectories: usize,

    /// Observed steps per trajectory
    #[arg(long, default_value_t = 8)]
    obs_len: usize,

    /// Predicted steps per trajectory
    #[arg(long, default_value_t = 12)]
    pred_len: usize,

    /// Mean distance travelled per step, in raw coordinate units
    #[arg(long, default_value_t = 4.0)]
    speed: f64,

    /// Maximum heading change per step, in radians
    #[arg(long, default_value_t = 0.35)]
    max_turn: f64,
}

/// Augmentations applied to the training split.
#[derive(Args, Debug, Clone)]
struct AugmentArgs {
    /// Turning threshold p: a trajectory turns when start-to-end distance < p * path length
    #[arg(long, default_value_t = 0.5)]
    turning_threshold: f64,

    /// Fraction of turning trajectories to jitter
    #[arg(long, default_value_t = 1.0)]
    turning_proportion: f64,

    /// Jitter distance for turning trajectories, in normalized units
    #[arg(long, default_value_t = 0.1)]
    jitter: f64,

    /// Skip the reversed copies
    #[arg(long, default_value_t = false)]
    no_reverse: bool,

    /// Skip the randomly rotated copies
    #[arg(long, default_value_t = false)]
    no_rotate: bool,

    /// Skip the axis-swapped copies
    #[arg(long, default_value_t = false)]
    no_swap: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline on a seeded synthetic set and print a JSON report
    Report {
        #[command(flatten)]
        synth: SynthArgs,

        #[command(flatten)]
        augment: AugmentArgs,

        /// Print compact instead of pretty-printed JSON
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
}

#[derive(Serialize)]
struct AugmentCounts {
    original: usize,
    reversed: usize,
    rotated: usize,
    swapped: usize,
    turning: usize,
    total: usize,
}

#[derive(Serialize)]
struct BaselineScores {
    ade_normalized: f64,
    fde_normalized: f64,
    ade_raw: f64,
    fde_raw: f64,
    ade_nabs: f64,
    fde_nabs: f64,
}

#[derive(Serialize)]
struct Report {
    seed: u64,
    train_shape: BatchShape,
    test_shape: BatchShape,
    norm_params: NormParams,
    augmentation: AugmentCounts,
    velocity_input_shape: BatchShape,
    velocity_target_shape: BatchShape,
    constant_velocity_baseline: BaselineScores,
}

/// Seeded random walks with smoothly drifting heading; some trajectories curve
/// hard enough to count as turning.
fn synthesize(args: &SynthArgs, rng: &mut ChaCha8Rng) -> Result<TrajectoryBatch> {
    let n_steps = args.obs_len + args.pred_len;
    let trajectories: Vec<Vec<[f64; 2]>> = (0..args.n_trajectories)
        .map(|_| {
            let mut p: [f64; 2] = [rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0)];
            let mut heading: f64 = rng.gen_range(0.0..TAU);
            let speed = args.speed * rng.gen_range(0.5..1.5);
            let bias = rng.gen_range(-args.max_turn..=args.max_turn);
            (0..n_steps)
                .map(|_| {
                    let point = p;
                    heading += bias + rng.gen_range(-0.2..=0.2) * args.max_turn;
                    p[0] += speed * heading.cos();
                    p[1] += speed * heading.sin();
                    point
                })
                .collect()
        })
        .collect();
    TrajectoryBatch::from_points(&trajectories).context("synthetic trajectories are invalid")
}

/// Extrapolate each observed trajectory with its last observed velocity.
fn constant_velocity(obs: &TrajectoryBatch, pred_len: usize) -> Result<TrajectoryBatch> {
    let vel = velocity(obs)?;
    let last = obs.n_steps() - 1;
    let mut data = Vec::with_capacity(obs.n_trajectories() * pred_len * XY);
    for i in 0..obs.n_trajectories() {
        let [x, y] = obs.xy(i, last);
        let [vx, vy] = vel.xy(i, last);
        for k in 1..=pred_len {
            let k = k as f64;
            data.extend_from_slice(&[x + k * vx, y + k * vy]);
        }
    }
    Ok(TrajectoryBatch::new(data, obs.n_trajectories(), pred_len)?)
}

fn run_report(seed: u64, synth: &SynthArgs, augment: &AugmentArgs) -> Result<Report> {
    anyhow::ensure!(
        synth.n_trajectories >= 2,
        "need at least 2 trajectories for a train/test split"
    );
    anyhow::ensure!(synth.obs_len >= 2, "obs_len must be at least 2");
    anyhow::ensure!(synth.pred_len >= 1, "pred_len must be at least 1");
    anyhow::ensure!(
        synth.speed.is_finite() && synth.speed > 0.0,
        "speed must be positive, got {}",
        synth.speed
    );
    anyhow::ensure!(
        synth.max_turn.is_finite() && synth.max_turn >= 0.0,
        "max_turn must be non-negative, got {}",
        synth.max_turn
    );

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let raw = synthesize(synth, &mut rng)?;
    info!(shape = %raw.shape(), "synthetic trajectories generated");

    let n_train = synth.n_trajectories / 2;
    let train_idx: Vec<usize> = (0..n_train).collect();
    let test_idx: Vec<usize> = (n_train..synth.n_trajectories).collect();
    let train = raw.select(&train_idx)?;
    let test = raw.select(&test_idx)?;

    // Normalization parameters come from the training split only.
    let (train_n, params) = normalize(&train, None).context("failed to normalize train split")?;
    let (test_n, _) = normalize(&test, Some(&params)).context("failed to normalize test split")?;
    info!(
        shift_x = params.shift_x(),
        shift_y = params.shift_y(),
        scale = params.scale(),
        "normalization fitted on train split"
    );

    let mut augmented = train_n.clone();
    let mut counts = AugmentCounts {
        original: train_n.n_trajectories(),
        reversed: 0,
        rotated: 0,
        swapped: 0,
        turning: 0,
        total: 0,
    };
    if !augment.no_reverse {
        let reversed = reverse(&train_n, false);
        counts.reversed = reversed.n_trajectories();
        augmented = augmented.concat(&reversed)?;
    }
    if !augment.no_rotate {
        let rotated = random_rotate(&train_n, None, &mut rng)?;
        counts.rotated = rotated.n_trajectories();
        augmented = augmented.concat(&rotated)?;
    }
    if !augment.no_swap {
        let swapped = swap_xy(&train_n)?;
        counts.swapped = swapped.n_trajectories();
        augmented = augmented.concat(&swapped)?;
    }
    let turning = TurningAugment::new(augment.turning_threshold)?
        .with_proportion(augment.turning_proportion)
        .with_offset(augment.jitter)
        .apply(&train_n, &mut rng)
        .context("turning augmentation failed")?;
    counts.turning = turning.n_trajectories();
    augmented = augmented.concat(&turning)?;
    counts.total = augmented.n_trajectories();
    info!(total = counts.total, turning = counts.turning, "training split augmented");

    let (train_obs, train_pred) = augmented.split_steps(synth.obs_len)?;
    let (velocity_input, velocity_target) = process_velocity(&train_obs, &train_pred)?;
    debug!(input = %velocity_input.shape(), "velocity features built");

    // Baseline scored three ways: normalized frame, raw frame, and nabs frame.
    let (test_obs, test_truth) = test_n.split_steps(synth.obs_len)?;
    let guess = constant_velocity(&test_obs, synth.pred_len)?;

    let guess_raw = unnormalize(&guess, &params)?;
    let truth_raw = unnormalize(&test_truth, &params)?;

    let (_, truth_nabs) = nabs_process(&test_obs, &test_truth)?;
    let (_, guess_nabs) = nabs_process(&test_obs, &guess)?;

    let scores = BaselineScores {
        ade_normalized: ade(&guess, &test_truth)?.value(),
        fde_normalized: fde(&guess, &test_truth)?.value(),
        ade_raw: ade(&guess_raw, &truth_raw)?.value(),
        fde_raw: fde(&guess_raw, &truth_raw)?.value(),
        ade_nabs: ade(&guess_nabs, &truth_nabs)?.value(),
        fde_nabs: fde(&guess_nabs, &truth_nabs)?.value(),
    };
    info!(
        ade = scores.ade_raw,
        fde = scores.fde_raw,
        "constant-velocity baseline scored"
    );

    Ok(Report {
        seed,
        train_shape: train.shape(),
        test_shape: test.shape(),
        norm_params: params,
        augmentation: counts,
        velocity_input_shape: velocity_input.shape(),
        velocity_target_shape: velocity_target.shape(),
        constant_velocity_baseline: scores,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Report {
            synth,
            augment,
            compact,
        } => {
            let report = run_report(cli.seed, &synth, &augment)?;
            let json = if compact {
                serde_json::to_string(&report)
            } else {
                serde_json::to_string_pretty(&report)
            }
            .context("failed to serialize report")?;
            println!("{json}");
        }
    }

    Ok(())
}
