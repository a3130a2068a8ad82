//! Generic retry wrapper (spec component B) - ported from the retry-decorator
//! idiom in the original implementation, expressed as a higher-order function.

use std::thread::sleep;
use std::time::Duration;

/// Call `f` up to `times` times, sleeping `delay` between attempts, returning
/// the first success or the last error if every attempt fails.
pub fn retry<F, T, E>(times: u32, delay: Duration, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f() {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= times {
                    return Err(error);
                }
                sleep(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_retry_succeeds_after_failures() {
        let calls = Cell::new(0);
        let result: Result<i32, &str> = retry(3, Duration::from_millis(1), || {
            let n = calls.get() + 1;
            calls.set(n);
            if n < 3 {
                Err("not yet")
            } else {
                Ok(42)
            }
        });
        assert_eq!(result, Ok(42));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_exhausts_attempts() {
        let calls = Cell::new(0);
        let result: Result<i32, &str> = retry(3, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            Err("always fails")
        });
        assert_eq!(result, Err("always fails"));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_succeeds_first_try_no_sleep() {
        let calls = Cell::new(0);
        let result: Result<i32, &str> = retry(3, Duration::from_secs(60), || {
            calls.set(calls.get() + 1);
            Ok(7)
        });
        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 1);
    }
}
