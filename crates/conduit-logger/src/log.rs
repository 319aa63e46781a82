use crate::severity::LogSeverity;
use crate::systime::now;

pub fn log(msg: String, log_severity: LogSeverity) {
    println!("[{}] {} {}", log_severity, now(), msg);
}
