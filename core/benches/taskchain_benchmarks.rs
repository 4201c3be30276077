use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use taskchain::{bind, task_fn, Collection, Outcome, State, Task, TaskOutput};
use tokio::runtime::Runtime; // To run async code within Criterion

// --- Common Benchmark Units ---
#[derive(Default)]
struct BenchTask {
  counter: parking_lot::Mutex<u64>,
  iterations: u64, // To control work inside run()
}

impl BenchTask {
  fn new(iterations: u64) -> Arc<Self> {
    Arc::new(Self {
      counter: parking_lot::Mutex::new(0),
      iterations,
    })
  }

  fn bump(&self) -> Outcome {
    let mut counter = self.counter.lock();
    *counter = counter.wrapping_add(1);
    Outcome::success().with("counter", *counter)
  }
}

#[async_trait::async_trait]
impl Task for BenchTask {
  async fn run(&self) -> TaskOutput {
    let mut counter = self.counter.lock();
    for _i in 0..self.iterations {
      // Simulate some CPU-bound work
      *counter = counter.wrapping_add(1);
    }
    Outcome::success().with("counter", *counter).into()
  }
}

// --- Collection builders ---

fn build_task_collection(num_tasks: usize, iterations: u64) -> Collection {
  let mut collection = Collection::new();
  for i in 0..num_tasks {
    collection.add_named(format!("task_{}", i), BenchTask::new(iterations));
  }
  collection
}

fn build_hooked_collection(num_hooks: usize) -> Collection {
  let unit = BenchTask::new(1);
  let mut collection = Collection::new();
  collection.add_named("main", unit.clone());
  for i in 0..num_hooks {
    if i % 2 == 0 {
      collection.before("main", bind(&unit, BenchTask::bump));
    } else {
      collection.after("main", bind(&unit, BenchTask::bump));
    }
  }
  collection
}

fn build_code_collection(num_steps: usize, delay_micros: u64) -> Collection {
  let mut collection = Collection::new();
  for i in 0..num_steps {
    collection.add_code(move |state: State| async move {
      if delay_micros > 0 {
        tokio::time::sleep(std::time::Duration::from_micros(delay_micros)).await;
      }
      state.insert(format!("step_{}", i), i);
    });
  }
  collection
}

// --- Benchmark Functions ---

fn bench_sequential_tasks(c: &mut Criterion) {
  let mut group = c.benchmark_group("SequentialTasks");
  let rt = Runtime::new().unwrap();

  for num_tasks in [1, 5, 10].iter() {
    for iterations in [1, 10, 100].iter() {
      group.throughput(Throughput::Elements(*num_tasks as u64 * *iterations));
      group.bench_with_input(
        BenchmarkId::new(format!("{}tasks_{}iter", num_tasks, iterations), *num_tasks as u64 * *iterations),
        &(*num_tasks, *iterations),
        |b, &(num_tasks, iterations)| {
          b.to_async(&rt).iter_batched(
            || build_task_collection(num_tasks, iterations),
            |mut collection| async move { collection.run().await.unwrap() },
            criterion::BatchSize::SmallInput,
          );
        },
      );
    }
  }
  group.finish();
}

fn bench_hook_resolution(c: &mut Criterion) {
  let mut group = c.benchmark_group("HookResolution");
  let rt = Runtime::new().unwrap();

  for num_hooks in [1, 10, 50].iter() {
    group.throughput(Throughput::Elements(*num_hooks as u64 + 1));
    group.bench_with_input(BenchmarkId::from_parameter(*num_hooks), num_hooks, |b, &num_hooks| {
      b.to_async(&rt).iter_batched(
        || build_hooked_collection(num_hooks),
        |mut collection| async move { collection.run().await.unwrap() },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_code_steps_async(c: &mut Criterion) {
  let mut group = c.benchmark_group("CodeStepsAsyncIO");
  let rt = Runtime::new().unwrap();

  for num_steps in [1, 5, 10].iter() {
    for delay_us in [0, 10, 100].iter() {
      group.throughput(Throughput::Elements(*num_steps as u64));
      group.bench_with_input(
        BenchmarkId::new(format!("{}steps_{}us_delay", num_steps, delay_us), *delay_us),
        &(*num_steps, *delay_us),
        |b, &(num_steps, delay_us)| {
          b.to_async(&rt).iter_batched(
            || build_code_collection(num_steps, delay_us),
            |mut collection| async move { collection.run().await.unwrap() },
            criterion::BatchSize::SmallInput,
          );
        },
      );
    }
  }
  group.finish();
}

fn bench_rollback_stack(c: &mut Criterion) {
  let mut group = c.benchmark_group("RollbackStack");
  let rt = Runtime::new().unwrap();

  for num_actions in [1, 10, 100].iter() {
    group.throughput(Throughput::Elements(*num_actions as u64));
    group.bench_with_input(BenchmarkId::from_parameter(*num_actions), num_actions, |b, &num_actions| {
      b.to_async(&rt).iter_batched(
        || {
          let mut collection = Collection::new();
          for _ in 0..num_actions {
            collection.rollback(task_fn(|| async {}));
            collection.completion(task_fn(|| async {}));
          }
          collection.add_code(|_state: State| async { 1 });
          collection
        },
        |mut collection| async move { collection.run().await.unwrap() },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_sequential_tasks,
  bench_hook_resolution,
  bench_code_steps_async,
  bench_rollback_stack
);
criterion_main!(benches);
