//! Recycling objects of several types through one shared pool.

use std::any::Any;
use std::thread;

use recycle_pool::RecyclePool;

#[derive(Debug, Default)]
struct Request {
    path: String,
    headers: Vec<(String, String)>,
}

fn main() {
    let pool = RecyclePool::new();

    // Warm up the pool so the first requests do not allocate.
    pool.preallocate(Request::default, 8);

    thread::scope(|s| {
        for worker in 0..4 {
            let pool = &pool;

            s.spawn(move || {
                let mut request = pool.allocate::<Request>();

                // Recycled objects keep their old contents, reset before use.
                request.path.clear();
                request.headers.clear();

                request.path.push_str("/index.html");
                request
                    .headers
                    .push(("x-worker".to_string(), worker.to_string()));

                println!("worker {worker} handled {request:?}");

                pool.free(request);
            });
        }
    });

    // Objects of different types can be freed without knowing their static type.
    let leftovers: Vec<Box<dyn Any + Send>> =
        vec![pool.allocate::<Request>(), pool.allocate::<Vec<u8>>()];

    for object in leftovers {
        pool.free_any(object);
    }

    println!(
        "pool holds {} free objects across {} types",
        pool.available(),
        pool.type_count()
    );
}
