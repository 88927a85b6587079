#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Give up on a join that has not been welcomed after this long.
    pub join_timeout_secs: u64,
    /// Resend the join request at this interval while waiting.
    pub join_retry_ms: u64,
    /// Drop a joined session after this much server silence.
    pub connection_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            join_timeout_secs: 10,
            join_retry_ms: 500,
            connection_timeout_secs: 10,
        }
    }
}
