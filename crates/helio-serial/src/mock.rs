//! Mock 串口通道
//!
//! 用于无硬件测试：按脚本依次返回应答，并记录所有通道操作以便断言调用顺序。
//! `MockChannel` 可 `clone`，克隆体共享同一份状态，测试可以在通道被
//! 移交给驱动后继续注入应答和检查写入。

use crate::{SerialChannel, SerialError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// 脚本化应答
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// 返回一行文本
    Line(String),
    /// 返回一行文本，随后在接收缓冲区留下多余的行
    LineWithTrailing { line: String, trailing: Vec<String> },
    /// 模拟读超时
    Timeout,
    /// 模拟通道关闭
    Closed,
}

/// 记录的通道操作
#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    Write(Vec<u8>),
    Flush,
    ReadLine,
    ClearInput,
    ClearOutput,
}

#[derive(Debug, Default)]
struct MockState {
    /// 按读取顺序排列的脚本应答
    replies: VecDeque<MockReply>,
    /// 已到达但尚未读取的字节（按行），`clear_input` 会丢弃
    input_buffer: VecDeque<String>,
    ops: Vec<MockOp>,
}

/// Mock 串口通道
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    /// 创建空脚本的通道
    pub fn new() -> Self {
        Self::default()
    }

    /// 以一组应答行创建通道
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channel = Self::new();
        for line in lines {
            channel.push_line(line);
        }
        channel
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // 测试线程 panic 后仍允许检查状态
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 追加一行应答
    pub fn push_line(&self, line: impl Into<String>) {
        self.push_reply(MockReply::Line(line.into()));
    }

    /// 追加任意脚本应答
    pub fn push_reply(&self, reply: MockReply) {
        self.lock().replies.push_back(reply);
    }

    /// 在接收缓冲区中放入一行"杂散"数据（下一次读取会先读到它，除非先被清空）
    pub fn push_stray_line(&self, line: impl Into<String>) {
        self.lock().input_buffer.push_back(line.into());
    }

    /// 所有已写入的数据块
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                MockOp::Write(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// 所有已写入的数据（按 UTF-8 解码）
    pub fn written_strings(&self) -> Vec<String> {
        self.written()
            .into_iter()
            .map(|data| String::from_utf8_lossy(&data).into_owned())
            .collect()
    }

    /// 完整的操作记录
    pub fn ops(&self) -> Vec<MockOp> {
        self.lock().ops.clone()
    }

    /// 清空操作记录
    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    /// 剩余未消费的脚本应答数量
    pub fn remaining_replies(&self) -> usize {
        self.lock().replies.len()
    }

    /// 接收缓冲区中剩余的行数
    pub fn buffered_lines(&self) -> usize {
        self.lock().input_buffer.len()
    }
}

impl SerialChannel for MockChannel {
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.lock().ops.push(MockOp::Write(data.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.lock().ops.push(MockOp::Flush);
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> Result<String, SerialError> {
        let mut state = self.lock();
        state.ops.push(MockOp::ReadLine);

        if let Some(line) = state.input_buffer.pop_front() {
            return Ok(line);
        }

        match state.replies.pop_front() {
            Some(MockReply::Line(line)) => Ok(line),
            Some(MockReply::LineWithTrailing { line, trailing }) => {
                state.input_buffer.extend(trailing);
                Ok(line)
            },
            Some(MockReply::Closed) => Err(SerialError::Closed),
            Some(MockReply::Timeout) | None => Err(SerialError::Timeout),
        }
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        let mut state = self.lock();
        state.ops.push(MockOp::ClearInput);
        state.input_buffer.clear();
        Ok(())
    }

    fn clear_output(&mut self) -> Result<(), SerialError> {
        self.lock().ops.push(MockOp::ClearOutput);
        Ok(())
    }

    fn describe(&self) -> String {
        String::from("mock")
    }
}
